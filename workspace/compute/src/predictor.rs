//! The prediction interface used by the presentation layer and its
//! implementation over a persisted estimator.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::sync::Arc;

use model::entities::artifact::{ModelArtifact, TargetKind, TimeFeatureKind};
use model::entities::estimator::Estimator;
use model::entities::historical_dataset::HistoricalDataset;
use tracing::{debug, info, instrument, warn};

use crate::confidence::{growth_range, ConfidenceHeuristic, GrowthRange};
use crate::error::{ComputeError, Result};
use crate::features::FeatureEncoder;
use crate::projection::{growth_between, project_price, Projection};
use crate::region_growth::{RegionGrowth, RegionGrowthTable};

/// Target of a prediction as entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredictionTarget {
    /// Calendar year, e.g. 2025.
    Year(i32),
    /// Years after the last observed year.
    Horizon(u32),
}

/// A target expressed both ways, once checked against the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedTarget {
    pub year: i32,
    pub horizon: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub region: String,
    pub target: PredictionTarget,
}

impl PredictionRequest {
    pub fn new(region: impl Into<String>, target: PredictionTarget) -> Self {
        Self {
            region: region.into(),
            target,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub region: String,
    pub target: ResolvedTarget,
    pub predicted_growth_percent: f64,
    /// Horizon heuristic, see [`ConfidenceHeuristic`].
    pub confidence: Option<f64>,
    pub growth_range: Option<GrowthRange>,
    pub last_year: Option<i32>,
    pub last_price: Option<f64>,
    pub projection: Projection,
}

/// The two questions the dashboard asks of a model.
pub trait GrowthPredictor: Send + Sync + Debug {
    /// Predicted growth for one region and target.
    fn predict_growth(&self, request: &PredictionRequest) -> Result<PredictionResult>;

    /// Predicted growth for every known region at one target.
    fn predict_region_growth_table(&self, target: PredictionTarget) -> Result<RegionGrowthTable>;
}

/// Bounds and presentation options of the predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorSettings {
    /// Latest target year accepted.
    pub max_year: i32,
    /// Largest horizon accepted.
    pub max_horizon: u32,
    pub confidence: Option<ConfidenceHeuristic>,
    /// Half-width of the simple growth range, in percentage points.
    pub range_margin: Option<f64>,
}

impl PredictorSettings {
    /// Checks a target against the last observed year and the configured bounds.
    pub fn resolve(&self, target: PredictionTarget, last_observed_year: i32) -> Result<ResolvedTarget> {
        let last = last_observed_year;
        let resolved = match target {
            PredictionTarget::Year(year) => {
                if year <= last {
                    return Err(ComputeError::InvalidRequest(format!(
                        "target year {} must be after the last observed year {}",
                        year, last
                    )));
                }
                if year > self.max_year {
                    return Err(ComputeError::InvalidRequest(format!(
                        "target year {} is after the latest supported year {}",
                        year, self.max_year
                    )));
                }
                ResolvedTarget {
                    year,
                    horizon: (year - last) as u32,
                }
            }
            PredictionTarget::Horizon(horizon) => {
                if horizon == 0 || horizon > self.max_horizon {
                    return Err(ComputeError::InvalidRequest(format!(
                        "horizon must be between 1 and {} years, got {}",
                        self.max_horizon, horizon
                    )));
                }
                let year = last + horizon as i32;
                if year > self.max_year {
                    return Err(ComputeError::InvalidRequest(format!(
                        "horizon {} reaches {}, after the latest supported year {}",
                        horizon, year, self.max_year
                    )));
                }
                ResolvedTarget { year, horizon }
            }
        };
        Ok(resolved)
    }

    /// Heuristic confidence at a horizon, when enabled.
    pub fn confidence(&self, horizon: u32) -> Option<f64> {
        self.confidence.map(|c| c.confidence(horizon))
    }
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            max_year: 2030,
            max_horizon: 50,
            confidence: Some(ConfidenceHeuristic::default()),
            range_margin: Some(crate::confidence::DEFAULT_RANGE_MARGIN),
        }
    }
}

/// What the estimator's columns and output mean.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub region_feature: String,
    pub time_feature: String,
    pub time_kind: TimeFeatureKind,
    pub target: TargetKind,
}

impl InputSpec {
    pub fn from_artifact(artifact: &ModelArtifact) -> Self {
        Self {
            region_feature: artifact.region_feature.clone(),
            time_feature: artifact.time_feature.name.clone(),
            time_kind: artifact.time_feature.kind,
            target: artifact.target,
        }
    }
}

/// [`GrowthPredictor`] backed by an [`Estimator`] and the historical dataset.
#[derive(Debug, Clone)]
pub struct EstimatorGrowthPredictor {
    pub(crate) estimator: Arc<dyn Estimator>,
    pub(crate) dataset: Arc<HistoricalDataset>,
    pub(crate) inputs: InputSpec,
    pub(crate) encoder: FeatureEncoder,
    settings: PredictorSettings,
    last_observed_year: i32,
}

impl EstimatorGrowthPredictor {
    pub fn new(
        estimator: Arc<dyn Estimator>,
        inputs: InputSpec,
        dataset: Arc<HistoricalDataset>,
        settings: PredictorSettings,
    ) -> Result<Self> {
        let encoder = FeatureEncoder::new(
            &inputs.region_feature,
            &inputs.time_feature,
            estimator.feature_names(),
        )?;
        let last_observed_year = dataset.last_year().ok_or_else(|| {
            ComputeError::NoData("the historical dataset has no observations".to_string())
        })?;

        let trained = encoder.trained_regions();
        for region in dataset.regions() {
            if !encoder.knows_region(&region) {
                warn!("Region '{}' has history but is unknown to the model", region);
            }
        }
        for region in &trained {
            if !dataset.contains_region(region) {
                warn!("Region '{}' is known to the model but has no history", region);
            }
        }
        info!(
            "Predictor ready: {} regions with history, {} trained regions, last observed year {}",
            dataset.regions().len(),
            trained.len(),
            last_observed_year
        );

        Ok(Self {
            estimator,
            dataset,
            inputs,
            encoder,
            settings,
            last_observed_year,
        })
    }

    pub fn from_artifact(
        artifact: Arc<ModelArtifact>,
        dataset: Arc<HistoricalDataset>,
        settings: PredictorSettings,
    ) -> Result<Self> {
        let inputs = InputSpec::from_artifact(&artifact);
        Self::new(artifact, inputs, dataset, settings)
    }

    pub fn last_observed_year(&self) -> i32 {
        self.last_observed_year
    }

    pub fn resolve_target(&self, target: PredictionTarget) -> Result<ResolvedTarget> {
        self.settings.resolve(target, self.last_observed_year)
    }

    /// Regions with history plus regions the model was trained on, sorted.
    pub fn known_regions(&self) -> Vec<String> {
        let mut regions: BTreeSet<String> = self.dataset.regions().into_iter().collect();
        regions.extend(self.encoder.trained_regions());
        regions.into_iter().collect()
    }

    pub(crate) fn time_value(&self, target: ResolvedTarget) -> f64 {
        match self.inputs.time_kind {
            TimeFeatureKind::Year => f64::from(target.year),
            TimeFeatureKind::Horizon => f64::from(target.horizon),
        }
    }

    /// Turns a raw model output into a growth percentage.
    fn growth_from_output(&self, output: f64, last_price: Option<f64>) -> Option<f64> {
        match self.inputs.target {
            TargetKind::GrowthPercent if output.is_finite() => Some(output),
            TargetKind::GrowthPercent => None,
            TargetKind::PricePerArea => growth_between(last_price, output),
        }
    }
}

impl GrowthPredictor for EstimatorGrowthPredictor {
    #[instrument(skip(self), fields(region = %request.region, target = ?request.target))]
    fn predict_growth(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        let region = request.region.as_str();
        let has_history = self.dataset.contains_region(region);
        if !has_history && !self.encoder.trained_regions().iter().any(|r| r == region) {
            return Err(ComputeError::UnknownRegion(region.to_string()));
        }
        if !self.encoder.knows_region(region) {
            return Err(ComputeError::NoData(format!(
                "the model was not trained with region '{}'",
                region
            )));
        }

        let target = self.resolve_target(request.target)?;
        let input = self
            .encoder
            .build_input(&[(region, self.time_value(target))])?;
        let output = self
            .estimator
            .predict(&input)?
            .first()
            .copied()
            .ok_or_else(|| ComputeError::Schema("the estimator returned no value".to_string()))?;

        let latest = self.dataset.latest(region);
        let last_price = latest.map(|r| r.price_per_area);
        let growth = self.growth_from_output(output, last_price).ok_or_else(|| {
            ComputeError::NoData(format!(
                "no usable last price for '{}' to derive growth from",
                region
            ))
        })?;
        debug!("Model output {} -> growth {:.4}%", output, growth);

        Ok(PredictionResult {
            region: region.to_string(),
            target,
            predicted_growth_percent: growth,
            confidence: self.settings.confidence(target.horizon),
            growth_range: self.settings.range_margin.map(|m| growth_range(growth, m)),
            last_year: latest.map(|r| r.year),
            last_price,
            projection: project_price(last_price, growth),
        })
    }

    #[instrument(skip(self))]
    fn predict_region_growth_table(&self, target: PredictionTarget) -> Result<RegionGrowthTable> {
        let target = self.resolve_target(target)?;
        let time_value = self.time_value(target);

        let mut entries = BTreeMap::new();
        let mut predictable: Vec<String> = Vec::new();
        for region in self.known_regions() {
            if self.encoder.knows_region(&region) {
                predictable.push(region);
            } else {
                entries.insert(
                    region,
                    RegionGrowth::NoData {
                        reason: "region unknown to the model".to_string(),
                    },
                );
            }
        }

        if !predictable.is_empty() {
            let rows: Vec<(&str, f64)> = predictable
                .iter()
                .map(|region| (region.as_str(), time_value))
                .collect();
            let input = self.encoder.build_input(&rows)?;
            let outputs = self.estimator.predict(&input)?;
            if outputs.len() != predictable.len() {
                return Err(ComputeError::Schema(format!(
                    "the estimator returned {} values for {} rows",
                    outputs.len(),
                    predictable.len()
                )));
            }

            for (region, output) in predictable.into_iter().zip(outputs) {
                let last_price = self.dataset.last_price(&region);
                let entry = match self.growth_from_output(output, last_price) {
                    Some(growth) => RegionGrowth::Predicted {
                        growth_percent: growth,
                        last_price,
                        projection: project_price(last_price, growth),
                    },
                    None => RegionGrowth::NoData {
                        reason: "no usable last price".to_string(),
                    },
                };
                entries.insert(region, entry);
            }
        }

        debug!("Region growth table for {} has {} entries", target.year, entries.len());
        Ok(RegionGrowthTable::new(target, entries))
    }
}
