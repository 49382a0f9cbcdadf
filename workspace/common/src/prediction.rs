use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::chart::ChartPoint;

/// Growth prediction for one region and target year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionDto {
    pub region: String,
    pub target_year: i32,
    /// Years after the last observed year
    pub horizon: u32,
    /// Predicted price change, in percent
    pub predicted_growth_percent: f64,
    /// Illustrative confidence in (0, 1], decreasing with the horizon
    pub confidence: Option<f64>,
    /// Caveat that must accompany the confidence value
    pub confidence_note: Option<String>,
    pub growth_range: Option<GrowthRangeDto>,
    pub projection: ProjectionDto,
    /// Historical points followed by the predicted point, when it exists
    pub series: Vec<ChartPoint>,
}

/// `predicted ± margin`, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GrowthRangeDto {
    pub lower: f64,
    pub upper: f64,
}

/// Absolute price implied by the predicted growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectionDto {
    pub last_year: Option<i32>,
    pub last_price: Option<f64>,
    pub projected_price: Option<f64>,
    /// True when no usable last price exists for the region
    pub no_data: bool,
    /// Formatted price or the "no data" label
    pub display: String,
}
