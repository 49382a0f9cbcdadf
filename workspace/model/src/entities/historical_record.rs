use serde::{Deserialize, Serialize};

/// One observed average price per area for a region and year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub region: String,
    pub year: i32,
    /// Average price in €/m².
    pub price_per_area: f64,
}

impl HistoricalRecord {
    pub fn new(region: impl Into<String>, year: i32, price_per_area: f64) -> Self {
        Self {
            region: region.into(),
            year,
            price_per_area,
        }
    }
}
