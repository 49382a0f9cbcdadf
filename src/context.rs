use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::BoundaryJoinReport;
use compute::cache::CachedGrowthPredictor;
use compute::confidence::ConfidenceHeuristic;
use compute::error::ComputeError;
use compute::predictor::{
    EstimatorGrowthPredictor, GrowthPredictor, PredictionTarget, PredictorSettings,
    ResolvedTarget,
};
use compute::region_growth::join_report;
use compute::scoring::fit_score;
use model::entities::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::config::AppConfig;

/// Everything loaded at startup. Immutable afterwards and shared by all
/// handlers.
#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub dataset: Arc<HistoricalDataset>,
    pub artifact: Arc<ModelArtifact>,
    /// `None` when the boundary file could not be loaded
    pub boundaries: Option<BoundaryCollection>,
    /// Why the map is unavailable, shown instead of it
    pub map_message: Option<String>,
    pub predictor: Arc<dyn GrowthPredictor>,
    pub settings: PredictorSettings,
    /// Regions with history or a trained coefficient, sorted
    pub regions: Vec<String>,
    /// In-sample R², only for calendar-year models
    pub fit_score: Option<f64>,
    pub join_report: Option<BoundaryJoinReport>,
    pub last_year: i32,
    pub first_year: i32,
    pub loaded_at: DateTime<Utc>,
}

impl AppContext {
    /// Loads the model and the dataset (both required) and the boundaries
    /// (optional: the map degrades to a message without them).
    #[instrument(skip(config))]
    pub fn load(config: AppConfig) -> Result<Self> {
        let artifact = ModelArtifact::load(&config.data.model_path).with_context(|| {
            format!(
                "Failed to load model artifact from {}",
                config.data.model_path.display()
            )
        })?;
        let dataset = HistoricalDataset::load_csv(&config.data.history_path, &config.data.columns)
            .with_context(|| {
                format!(
                    "Failed to load historical data from {}",
                    config.data.history_path.display()
                )
            })?;
        let boundaries = BoundaryCollection::load(
            &config.data.boundaries_path,
            &config.data.boundary_name_property,
        )
        .map_err(|e| {
            warn!("Boundary file unavailable, the map will not be shown: {}", e);
            format!("Mapa no disponible: {}", e)
        });

        Self::from_parts(config, artifact, dataset, boundaries)
    }

    /// Builds the context from already loaded artifacts.
    pub fn from_parts(
        config: AppConfig,
        artifact: ModelArtifact,
        dataset: HistoricalDataset,
        boundaries: std::result::Result<BoundaryCollection, String>,
    ) -> Result<Self> {
        let artifact = Arc::new(artifact);
        let dataset = Arc::new(dataset);
        let settings = predictor_settings(&config)?;

        let predictor = EstimatorGrowthPredictor::from_artifact(
            artifact.clone(),
            dataset.clone(),
            settings.clone(),
        )
        .context("The model cannot be used with this dataset")?;
        let fit_score = fit_score(&predictor).context("Failed to score the model")?;
        let last_year = predictor.last_observed_year();
        let first_year = dataset.first_year().unwrap_or(last_year);
        let regions = predictor.known_regions();

        let (boundaries, map_message) = match boundaries {
            Ok(boundaries) => (Some(boundaries), None),
            Err(message) => (None, Some(message)),
        };
        let join_report = boundaries.as_ref().map(|b| {
            let report = join_report(regions.iter().map(String::as_str), b);
            if !report.dataset_only.is_empty() {
                warn!("Regions without a boundary: {:?}", report.dataset_only);
            }
            if !report.boundary_only.is_empty() {
                warn!("Boundaries without data: {:?}", report.boundary_only);
            }
            report
        });

        info!(
            "Context loaded: {} regions, years {}..={}, fit score {:?}",
            regions.len(),
            first_year,
            last_year,
            fit_score
        );

        let predictor = CachedGrowthPredictor::new(
            predictor,
            config.cache.max_capacity as usize,
            Duration::from_secs(config.cache.ttl_secs),
        );

        Ok(Self {
            config,
            dataset,
            artifact,
            boundaries,
            map_message,
            predictor: Arc::new(predictor),
            settings,
            regions,
            fit_score,
            join_report,
            last_year,
            first_year,
            loaded_at: Utc::now(),
        })
    }

    /// Checks a target against the configured bounds and the last observed year.
    pub fn resolve_target(
        &self,
        target: PredictionTarget,
    ) -> std::result::Result<ResolvedTarget, ComputeError> {
        self.settings.resolve(target, self.last_year)
    }

    pub fn min_target_year(&self) -> i32 {
        self.last_year + 1
    }

    pub fn max_target_year(&self) -> i32 {
        self.config
            .prediction
            .max_year
            .min(self.last_year + self.config.prediction.max_horizon as i32)
    }

    pub fn show_confidence(&self) -> bool {
        self.config.prediction.show_confidence
    }
}

fn predictor_settings(config: &AppConfig) -> Result<PredictorSettings> {
    let prediction = &config.prediction;
    let confidence = if prediction.show_confidence {
        Some(ConfidenceHeuristic::new(prediction.confidence_decay)?)
    } else {
        None
    };
    Ok(PredictorSettings {
        max_year: prediction.max_year,
        max_horizon: prediction.max_horizon,
        confidence,
        range_margin: prediction
            .show_growth_range
            .then_some(prediction.growth_range_margin),
    })
}
