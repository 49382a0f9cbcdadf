use std::fmt::Debug;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// The single contract the dashboard relies on: a fitted regressor that
/// predicts one value per row of a table whose columns are exactly the
/// training-time feature names, in training order.
pub trait Estimator: Send + Sync + Debug {
    /// Training-time feature names, in the order the estimator was fitted on.
    fn feature_names(&self) -> &[String];

    /// Predicts one value per input row.
    fn predict(&self, input: &DataFrame) -> Result<Vec<f64>>;
}

/// Fitted parameters of the supported regressors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorKind {
    /// `intercept + Σ coefficients[i] · x[i]`
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    /// A regression tree stored as a flat node list, root at index 0.
    DecisionTree { nodes: Vec<TreeNode> },
}

/// Regression tree node. Rows with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

impl EstimatorKind {
    /// Checks the parameters against the number of trained features.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        match self {
            EstimatorKind::Linear { coefficients, .. } => {
                if coefficients.len() != n_features {
                    return Err(ModelError::Artifact(format!(
                        "linear model has {} coefficients for {} features",
                        coefficients.len(),
                        n_features
                    )));
                }
            }
            EstimatorKind::DecisionTree { nodes } => {
                if nodes.is_empty() {
                    return Err(ModelError::Artifact("decision tree has no nodes".to_string()));
                }
                for (index, node) in nodes.iter().enumerate() {
                    if let TreeNode::Split {
                        feature,
                        left,
                        right,
                        ..
                    } = node
                    {
                        if *feature >= n_features {
                            return Err(ModelError::Artifact(format!(
                                "node {} splits on feature {} but only {} features exist",
                                index, feature, n_features
                            )));
                        }
                        if *left >= nodes.len() || *right >= nodes.len() {
                            return Err(ModelError::Artifact(format!(
                                "node {} points outside the tree",
                                index
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Evaluates one feature row.
    pub fn evaluate(&self, row: &[f64]) -> Result<f64> {
        match self {
            EstimatorKind::Linear {
                intercept,
                coefficients,
            } => Ok(coefficients
                .iter()
                .zip(row)
                .fold(*intercept, |acc, (c, x)| acc + c * x)),
            EstimatorKind::DecisionTree { nodes } => {
                let mut index = 0;
                // A well-formed tree reaches a leaf in fewer steps than it has nodes.
                for _ in 0..nodes.len() {
                    match &nodes[index] {
                        TreeNode::Leaf { value } => return Ok(*value),
                        TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            index = if row[*feature] <= *threshold { *left } else { *right };
                        }
                    }
                }
                Err(ModelError::Artifact(
                    "decision tree contains a cycle".to_string(),
                ))
            }
        }
    }
}

/// Extracts the rows of `input` as f64 vectors after checking that its
/// columns are exactly `feature_names`, in order.
pub fn feature_rows(input: &DataFrame, feature_names: &[String]) -> Result<Vec<Vec<f64>>> {
    let columns: Vec<&str> = input
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    if columns.len() != feature_names.len()
        || columns.iter().zip(feature_names).any(|(a, b)| *a != b.as_str())
    {
        return Err(ModelError::SchemaMismatch(format!(
            "expected columns {:?}, got {:?}",
            feature_names, columns
        )));
    }

    let mut rows = vec![Vec::with_capacity(feature_names.len()); input.height()];
    for name in feature_names {
        let column = input.column(name)?.cast(&DataType::Float64)?;
        let values = column.as_materialized_series().f64()?;
        for (row, value) in rows.iter_mut().zip(values.into_iter()) {
            let value = value.ok_or_else(|| {
                ModelError::SchemaMismatch(format!("null value in column '{}'", name))
            })?;
            row.push(value);
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> EstimatorKind {
        // x0 <= 2024.5 ? (x1 <= 0.5 ? 1.0 : 2.0) : 3.0
        EstimatorKind::DecisionTree {
            nodes: vec![
                TreeNode::Split { feature: 0, threshold: 2024.5, left: 1, right: 4 },
                TreeNode::Split { feature: 1, threshold: 0.5, left: 2, right: 3 },
                TreeNode::Leaf { value: 1.0 },
                TreeNode::Leaf { value: 2.0 },
                TreeNode::Leaf { value: 3.0 },
            ],
        }
    }

    #[test]
    fn test_linear_evaluation() {
        let model = EstimatorKind::Linear {
            intercept: 1.0,
            coefficients: vec![0.5, 2.0],
        };
        assert_eq!(model.evaluate(&[2.0, 1.0]).unwrap(), 4.0);
    }

    #[test]
    fn test_tree_evaluation() {
        let model = tree();
        assert_eq!(model.evaluate(&[2024.0, 0.0]).unwrap(), 1.0);
        assert_eq!(model.evaluate(&[2024.0, 1.0]).unwrap(), 2.0);
        assert_eq!(model.evaluate(&[2025.0, 1.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_tree_cycle_is_an_error() {
        let model = EstimatorKind::DecisionTree {
            nodes: vec![TreeNode::Split { feature: 0, threshold: 0.0, left: 0, right: 0 }],
        };
        assert!(model.validate(1).is_ok());
        assert!(model.evaluate(&[1.0]).is_err());
    }

    #[test]
    fn test_validation() {
        let linear = EstimatorKind::Linear {
            intercept: 0.0,
            coefficients: vec![1.0],
        };
        assert!(linear.validate(1).is_ok());
        assert!(linear.validate(2).is_err());

        assert!(tree().validate(2).is_ok());
        assert!(tree().validate(1).is_err());
    }

    #[test]
    fn test_tree_node_deserialization() {
        let nodes: Vec<TreeNode> = serde_json::from_str(
            r#"[{"feature": 0, "threshold": 1.5, "left": 1, "right": 2}, {"value": 4.0}]"#,
        )
        .unwrap();
        assert!(matches!(nodes[0], TreeNode::Split { feature: 0, .. }));
        assert_eq!(nodes[1], TreeNode::Leaf { value: 4.0 });
    }

    #[test]
    fn test_feature_rows_checks_column_order() {
        let names = vec!["year".to_string(), "comunidad_Madrid".to_string()];
        let ordered = DataFrame::new(vec![
            Series::new("year".into(), vec![2025i32]).into(),
            Series::new("comunidad_Madrid".into(), vec![1.0f64]).into(),
        ])
        .unwrap();
        assert_eq!(feature_rows(&ordered, &names).unwrap(), vec![vec![2025.0, 1.0]]);

        let swapped = DataFrame::new(vec![
            Series::new("comunidad_Madrid".into(), vec![1.0f64]).into(),
            Series::new("year".into(), vec![2025i32]).into(),
        ])
        .unwrap();
        let err = feature_rows(&swapped, &names).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));
    }
}
