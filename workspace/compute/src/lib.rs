pub mod cache;
pub mod confidence;
pub mod error;
pub mod features;
pub mod forecast;
pub mod predictor;
pub mod projection;
pub mod region_growth;
pub mod scoring;

#[cfg(test)]
mod testing;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use cache::CachedGrowthPredictor;
    use common::SeriesKind;
    use predictor::{
        EstimatorGrowthPredictor, GrowthPredictor, PredictionRequest, PredictionTarget,
        PredictorSettings,
    };
    use projection::{projection_series, Projection};
    use testing::{fixture_artifact, fixture_dataset};

    use super::*;

    /// Madrid, last price 3000 €/m² in 2023, model predicting +4.5 %: the
    /// 2025 projection is 3135 €/m² and closes the chart series.
    #[test]
    fn test_cached_estimator_end_to_end() {
        let dataset = Arc::new(fixture_dataset());
        let estimator = EstimatorGrowthPredictor::from_artifact(
            Arc::new(fixture_artifact()),
            dataset.clone(),
            PredictorSettings::default(),
        )
        .unwrap();
        let predictor = CachedGrowthPredictor::new(estimator, 100, Duration::from_secs(300));

        let result = predictor
            .predict_growth(&PredictionRequest::new("Madrid", PredictionTarget::Year(2025)))
            .unwrap();
        assert_eq!(result.predicted_growth_percent, 4.5);
        assert_eq!(result.projection, Projection::Price(3135.0));

        let series = projection_series(
            &dataset.records_for("Madrid"),
            result.target.year,
            result.projection,
        );
        let last = series.last().unwrap();
        assert_eq!((last.year, last.price_per_area), (2025, 3135.0));
        assert_eq!(last.kind, SeriesKind::Prediction);
        assert_eq!(last.kind.label(), "Predicción");
    }
}
