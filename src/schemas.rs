use common::{
    BoundaryJoinReport, CellStatus, ChartPoint, ChartSeries, ForecastRowDto, GrowthRangeDto,
    MapCellDto, PredictionDto, ProjectionDto, RegionGrowthDto, SeriesKind,
};
use compute::predictor::PredictionTarget;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

use crate::context::AppContext;
use crate::error::ApiError;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Artifacts and predictor loaded at startup
    pub context: Arc<AppContext>,
    /// Cache for computed API payloads
    pub cache: Cache<String, CachedData>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Prediction(PredictionDto),
    RegionGrowth(RegionGrowthDto),
    Forecast(Vec<ForecastRowDto>),
}

/// Query parameters for the history endpoint
#[derive(Debug, Deserialize, Serialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Region name; all regions when absent
    #[validate(length(min = 1, max = 100))]
    pub region: Option<String>,
}

/// A target year or a horizon, exactly one of them
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct TargetQuery {
    /// Target calendar year (e.g., 2025)
    #[validate(range(min = 1900, max = 2200))]
    pub year: Option<i32>,
    /// Years after the last observed year
    #[validate(range(min = 1, max = 200))]
    pub horizon: Option<u32>,
}

impl TargetQuery {
    pub fn target(&self) -> Result<PredictionTarget, ApiError> {
        self.validate()?;
        match (self.year, self.horizon) {
            (Some(year), None) => Ok(PredictionTarget::Year(year)),
            (None, Some(horizon)) => Ok(PredictionTarget::Horizon(horizon)),
            (Some(_), Some(_)) => Err(ApiError::BadRequest(
                "give either 'year' or 'horizon', not both".to_string(),
            )),
            (None, None) => Err(ApiError::BadRequest(
                "one of 'year' or 'horizon' is required".to_string(),
            )),
        }
    }

    /// Like [`TargetQuery::target`], defaulting to one year after the data.
    pub fn target_or_next(&self) -> Result<PredictionTarget, ApiError> {
        if self.year.is_none() && self.horizon.is_none() {
            return Ok(PredictionTarget::Horizon(1));
        }
        self.target()
    }
}

/// Query parameters for predictions and the chart download
#[derive(Debug, Deserialize, Serialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct PredictionQuery {
    /// Region name, exactly as in the data
    #[validate(length(min = 1, max = 100))]
    pub region: String,
    /// Target calendar year (e.g., 2025)
    pub year: Option<i32>,
    /// Years after the last observed year
    pub horizon: Option<u32>,
}

impl PredictionQuery {
    pub fn target(&self) -> Result<PredictionTarget, ApiError> {
        self.validate()?;
        TargetQuery {
            year: self.year,
            horizon: self.horizon,
        }
        .target()
    }
}

/// Query parameters for the forecast table and its download
#[derive(Debug, Deserialize, Serialize, ToSchema, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ForecastQuery {
    /// Target calendar year (e.g., 2025)
    pub year: Option<i32>,
    /// Years after the last observed year
    pub horizon: Option<u32>,
    /// Limit the table to one region
    #[validate(length(min = 1, max = 100))]
    pub region: Option<String>,
}

impl ForecastQuery {
    pub fn target(&self) -> Result<PredictionTarget, ApiError> {
        self.validate()?;
        TargetQuery {
            year: self.year,
            horizon: self.horizon,
        }
        .target_or_next()
    }
}

/// Regions and bounds the dashboard offers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegionsResponse {
    pub regions: Vec<String>,
    pub first_year: i32,
    pub last_year: i32,
    pub min_target_year: i32,
    pub max_target_year: i32,
    pub max_horizon: u32,
    /// `year` or `horizon`
    pub time_feature_kind: String,
    /// `growth_percent` or `price_per_area`
    pub target_kind: String,
    pub model_description: Option<String>,
    /// In-sample R² of the model, when it can be computed
    pub fit_score: Option<f64>,
    pub map_available: bool,
    pub map_message: Option<String>,
    pub join_report: Option<BoundaryJoinReport>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Estimator kind of the loaded model
    pub model: String,
    /// Number of regions with history
    pub regions: usize,
    /// `available` or `unavailable`
    pub map: String,
    /// When the artifacts were loaded (RFC 3339)
    pub loaded_at: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::regions::get_regions,
        crate::handlers::history::get_history,
        crate::handlers::predictions::get_prediction,
        crate::handlers::region_growth::get_region_growth,
        crate::handlers::forecast::get_forecast,
        crate::handlers::exports::export_forecast_xlsx,
        crate::handlers::exports::export_forecast_csv,
        crate::handlers::exports::export_projection_png,
    ),
    components(
        schemas(
            ApiResponse<PredictionDto>,
            ApiResponse<RegionGrowthDto>,
            ApiResponse<Vec<ForecastRowDto>>,
            ApiResponse<Vec<ChartSeries>>,
            ApiResponse<RegionsResponse>,
            ErrorResponse,
            HealthResponse,
            RegionsResponse,
            HistoryQuery,
            TargetQuery,
            PredictionQuery,
            ForecastQuery,
            PredictionDto,
            GrowthRangeDto,
            ProjectionDto,
            ChartPoint,
            ChartSeries,
            SeriesKind,
            RegionGrowthDto,
            MapCellDto,
            CellStatus,
            ForecastRowDto,
            BoundaryJoinReport,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "data", description = "Regions and historical prices"),
        (name = "predictions", description = "Growth predictions and price projections"),
        (name = "exports", description = "Downloadable tables and charts"),
    ),
    info(
        title = "Housecast API",
        description = "Housing price growth predictions per autonomous community, with projections, maps and forecasts",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
