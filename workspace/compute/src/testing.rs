//! Small in-memory fixtures shared by the compute tests.

use std::sync::Arc;

use model::entities::artifact::ModelArtifact;
use model::entities::historical_dataset::HistoricalDataset;
use model::entities::historical_record::HistoricalRecord;

use crate::predictor::{EstimatorGrowthPredictor, PredictorSettings};

/// Linear growth model: Madrid +4.5 %, Cataluña +2.0 %, whatever the year.
pub const LINEAR_ARTIFACT: &str = r#"{
    "target": "growth_percent",
    "region_feature": "comunidad",
    "time_feature": {"name": "year", "kind": "year"},
    "feature_names": ["year", "comunidad_Madrid", "comunidad_Cataluña"],
    "estimator": {"kind": "linear", "intercept": 0.0, "coefficients": [0.0, 4.5, 2.0]}
}"#;

pub fn fixture_records() -> Vec<HistoricalRecord> {
    vec![
        HistoricalRecord::new("Madrid", 2022, 2900.0),
        HistoricalRecord::new("Madrid", 2023, 3000.0),
        HistoricalRecord::new("Cataluña", 2022, 2600.0),
        HistoricalRecord::new("Cataluña", 2023, 2700.0),
    ]
}

pub fn fixture_dataset() -> HistoricalDataset {
    HistoricalDataset::from_records(fixture_records()).unwrap()
}

pub fn fixture_artifact() -> ModelArtifact {
    ModelArtifact::from_json_str(LINEAR_ARTIFACT).unwrap()
}

pub fn fixture_predictor() -> EstimatorGrowthPredictor {
    EstimatorGrowthPredictor::from_artifact(
        Arc::new(fixture_artifact()),
        Arc::new(fixture_dataset()),
        PredictorSettings::default(),
    )
    .unwrap()
}
