use anyhow::{Context, Result};
use model::entities::historical_dataset::ColumnMapping;
use moka::future::Cache;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use validator::Validate;

use crate::context::AppContext;
use crate::schemas::AppState;

const DEFAULT_CONFIG_FILE: &str = "configuration/base.yaml";

/// Application settings, layered: defaults, then the YAML file, then
/// `HOUSECAST__SECTION__KEY` environment variables.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerSettings,
    #[validate(nested)]
    pub data: DataSettings,
    #[validate(nested)]
    pub prediction: PredictionSettings,
    #[validate(nested)]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ServerSettings {
    #[validate(length(min = 1))]
    pub bind_address: String,
    /// Per-request timeout, in seconds
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DataSettings {
    pub model_path: PathBuf,
    pub history_path: PathBuf,
    pub boundaries_path: PathBuf,
    /// GeoJSON property holding the region name
    #[validate(length(min = 1))]
    pub boundary_name_property: String,
    #[serde(default)]
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictionSettings {
    #[validate(range(min = 1900, max = 2200))]
    pub max_year: i32,
    #[validate(range(min = 1, max = 200))]
    pub max_horizon: u32,
    pub show_confidence: bool,
    #[validate(range(exclusive_min = 0.0, max = 10.0))]
    pub confidence_decay: f64,
    pub show_growth_range: bool,
    #[validate(range(min = 0.0, max = 100.0))]
    pub growth_range_margin: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CacheSettings {
    #[validate(range(min = 1))]
    pub max_capacity: u64,
    pub ttl_secs: u64,
}

impl AppConfig {
    /// Loads `.env`, the YAML file and the environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        debug!("Reading configuration from {}", file.display());

        let settings = config::Config::builder()
            .set_default("server.bind_address", "0.0.0.0:3000")?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("data.model_path", "data/sample/modelo_vivienda.json")?
            .set_default("data.history_path", "data/sample/datos_historicos.csv")?
            .set_default("data.boundaries_path", "data/sample/spain_communities.geojson")?
            .set_default("data.boundary_name_property", "name")?
            .set_default("prediction.max_year", 2030)?
            .set_default("prediction.max_horizon", 50)?
            .set_default("prediction.show_confidence", true)?
            .set_default("prediction.confidence_decay", compute::confidence::DEFAULT_DECAY)?
            .set_default("prediction.show_growth_range", true)?
            .set_default(
                "prediction.growth_range_margin",
                compute::confidence::DEFAULT_RANGE_MARGIN,
            )?
            .set_default("cache.max_capacity", 1000)?
            .set_default("cache.ttl_secs", 300)?
            .add_source(config::File::from(file.as_path()).required(path.is_some()))
            .add_source(
                config::Environment::with_prefix("HOUSECAST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize settings")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

/// Loads every artifact and builds the shared handler state.
pub fn initialize_app_state(config: AppConfig) -> Result<AppState> {
    let cache = Cache::builder()
        .max_capacity(config.cache.max_capacity)
        .time_to_live(Duration::from_secs(config.cache.ttl_secs))
        .build();

    let context = AppContext::load(config)?;
    info!(
        "Application state ready: {} regions, map {}",
        context.regions.len(),
        if context.boundaries.is_some() { "available" } else { "unavailable" }
    );

    Ok(AppState {
        context: Arc::new(context),
        cache,
    })
}
