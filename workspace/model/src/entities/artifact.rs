use std::collections::HashSet;
use std::fs;
use std::path::Path;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::estimator::{feature_rows, Estimator, EstimatorKind};
use crate::error::{ModelError, Result};

const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// What the estimator's output means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Predicted year-on-year change of the price, in percent.
    GrowthPercent,
    /// Predicted absolute price per area, in €/m².
    PricePerArea,
}

/// How the time column of the training data was expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFeatureKind {
    /// Calendar year, e.g. 2025.
    Year,
    /// Years after the last observed year.
    Horizon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFeature {
    pub name: String,
    pub kind: TimeFeatureKind,
}

/// A persisted, already fitted model together with the metadata needed to
/// build its input: the categorical region column (one-hot encoded as
/// `<region_feature>_<region>`), the time column and the exact training-time
/// feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    /// Human readable summary shown on the dashboard.
    #[serde(default)]
    pub description: Option<String>,
    pub target: TargetKind,
    pub region_feature: String,
    pub time_feature: TimeFeature,
    pub feature_names: Vec<String>,
    pub estimator: EstimatorKind,
}

fn default_format_version() -> u32 {
    SUPPORTED_FORMAT_VERSION
}

impl ModelArtifact {
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
        let artifact: Self = serde_json::from_str(&content).map_err(|source| ModelError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        artifact.validate()?;
        info!(
            "Loaded {:?} model artifact with {} features (target {:?}, time feature '{}' as {:?})",
            artifact.estimator_name(),
            artifact.feature_names.len(),
            artifact.target,
            artifact.time_feature.name,
            artifact.time_feature.kind
        );
        Ok(artifact)
    }

    /// Parses and validates an artifact held in memory.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(content)
            .map_err(|e| ModelError::Artifact(format!("cannot parse artifact: {}", e)))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<()> {
        if self.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ModelError::Artifact(format!(
                "unsupported format version {} (expected {})",
                self.format_version, SUPPORTED_FORMAT_VERSION
            )));
        }
        if self.feature_names.is_empty() {
            return Err(ModelError::Artifact("feature list is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for name in &self.feature_names {
            if !seen.insert(name.as_str()) {
                return Err(ModelError::Artifact(format!("duplicate feature '{}'", name)));
            }
        }
        self.estimator.validate(self.feature_names.len())?;
        debug!("Artifact validated");
        Ok(())
    }

    pub fn estimator_name(&self) -> &'static str {
        match self.estimator {
            EstimatorKind::Linear { .. } => "linear",
            EstimatorKind::DecisionTree { .. } => "decision_tree",
        }
    }
}

impl Estimator for ModelArtifact {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, input: &DataFrame) -> Result<Vec<f64>> {
        feature_rows(input, &self.feature_names)?
            .iter()
            .map(|row| self.estimator.evaluate(row))
            .collect()
    }
}
