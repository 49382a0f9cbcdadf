use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How a region is rendered on the choropleth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    /// Has a predicted value and a boundary
    Predicted,
    /// Has a boundary but no value
    NoData,
    /// Has a value but no boundary with a matching name
    NotOnMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MapCellDto {
    pub region: String,
    pub status: CellStatus,
    pub growth_percent: Option<f64>,
    pub projected_price: Option<f64>,
    pub reason: Option<String>,
}

/// Per-region growth for one target year, joined with the boundary file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegionGrowthDto {
    pub target_year: i32,
    pub horizon: u32,
    pub cells: Vec<MapCellDto>,
    /// False when the boundary file could not be loaded
    pub map_available: bool,
    pub map_message: Option<String>,
}

/// One line of the forecast table and of the spreadsheet export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastRowDto {
    pub region: String,
    pub year: i32,
    pub growth_percent: Option<f64>,
    pub last_price: Option<f64>,
    pub projected_price: Option<f64>,
    pub confidence: Option<f64>,
    pub recommendation: Option<String>,
}

/// Result of joining dataset region names against boundary names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BoundaryJoinReport {
    pub matched: Vec<String>,
    /// Boundaries that will always render as "no data"
    pub boundary_only: Vec<String>,
    /// Regions that cannot be drawn on the map
    pub dataset_only: Vec<String>,
}

impl BoundaryJoinReport {
    pub fn is_exact(&self) -> bool {
        self.boundary_only.is_empty() && self.dataset_only.is_empty()
    }
}
