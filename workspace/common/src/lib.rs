//! Common transport-layer types shared between the compute crate and the
//! HTTP handlers. Field names here are the JSON contract of the API.

mod chart;
mod format;
mod prediction;
mod region_growth;

pub use chart::{ChartPoint, ChartSeries, SeriesKind};
pub use format::{format_percent, format_price_eur, NO_DATA_LABEL};
pub use prediction::{GrowthRangeDto, PredictionDto, ProjectionDto};
pub use region_growth::{
    BoundaryJoinReport, CellStatus, ForecastRowDto, MapCellDto, RegionGrowthDto,
};
