//! In-sample fit score of the estimator over the historical rows.

use model::entities::artifact::{TargetKind, TimeFeatureKind};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::predictor::EstimatorGrowthPredictor;
use crate::projection::growth_between;

/// Coefficient of determination, `None` for fewer than two points or
/// constant labels.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.len() < 2 || actual.len() != predicted.len() {
        return None;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let total: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    if total == 0.0 {
        return None;
    }
    let residual: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    Some(1.0 - residual / total)
}

/// R² of the estimator on the historical data it can be compared against.
///
/// Only calendar-year models are scored: a horizon has no meaning for past
/// observations. Growth models are compared with the year-over-year change
/// of consecutive observations, price models with the observed prices.
#[instrument(skip(predictor))]
pub fn fit_score(predictor: &EstimatorGrowthPredictor) -> Result<Option<f64>> {
    if predictor.inputs.time_kind != TimeFeatureKind::Year {
        debug!("Horizon model, fit score skipped");
        return Ok(None);
    }

    let mut rows: Vec<(&str, f64)> = Vec::new();
    let mut labels: Vec<f64> = Vec::new();
    for region in predictor.dataset.regions() {
        if !predictor.encoder.knows_region(&region) {
            continue;
        }
        let history = predictor.dataset.records_for(&region);
        for (index, record) in history.iter().enumerate() {
            let label = match predictor.inputs.target {
                TargetKind::PricePerArea => Some(record.price_per_area),
                TargetKind::GrowthPercent => index
                    .checked_sub(1)
                    .map(|prev| &history[prev])
                    .filter(|prev| prev.year + 1 == record.year)
                    .and_then(|prev| growth_between(Some(prev.price_per_area), record.price_per_area)),
            };
            if let Some(label) = label {
                rows.push((record.region.as_str(), f64::from(record.year)));
                labels.push(label);
            }
        }
    }

    if rows.is_empty() {
        return Ok(None);
    }
    let input = predictor.encoder.build_input(&rows)?;
    let predicted = predictor.estimator.predict(&input)?;
    let score = r_squared(&labels, &predicted);
    info!("In-sample fit over {} rows: {:?}", labels.len(), score);
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::PredictorSettings;
    use crate::testing::{fixture_dataset, LINEAR_ARTIFACT};
    use model::entities::artifact::ModelArtifact;
    use std::sync::Arc;

    #[test]
    fn test_r_squared() {
        assert_eq!(r_squared(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), Some(1.0));
        assert_eq!(r_squared(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]), Some(0.0));
        assert_eq!(r_squared(&[1.0, 1.0], &[1.0, 1.0]), None);
        assert_eq!(r_squared(&[1.0], &[1.0]), None);
    }

    #[test]
    fn test_price_model_scored_on_prices() {
        // Perfect on the fixture: 100 €/m² per year plus a regional offset.
        let artifact = ModelArtifact::from_json_str(
            &LINEAR_ARTIFACT
                .replace("growth_percent", "price_per_area")
                .replace("\"intercept\": 0.0", "\"intercept\": -199300.0")
                .replace("[0.0, 4.5, 2.0]", "[100.0, 0.0, -300.0]"),
        )
        .unwrap();
        let predictor = EstimatorGrowthPredictor::from_artifact(
            Arc::new(artifact),
            Arc::new(fixture_dataset()),
            PredictorSettings::default(),
        )
        .unwrap();

        let score = fit_score(&predictor).unwrap().unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizon_model_is_not_scored() {
        let artifact = ModelArtifact::from_json_str(
            &LINEAR_ARTIFACT.replace(
                "{\"name\": \"year\", \"kind\": \"year\"}",
                "{\"name\": \"year\", \"kind\": \"horizon\"}",
            ),
        )
        .unwrap();
        let predictor = EstimatorGrowthPredictor::from_artifact(
            Arc::new(artifact),
            Arc::new(fixture_dataset()),
            PredictorSettings::default(),
        )
        .unwrap();
        assert_eq!(fit_score(&predictor).unwrap(), None);
    }
}
