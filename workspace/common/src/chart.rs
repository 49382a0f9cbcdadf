use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Whether a chart point was observed or predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SeriesKind {
    #[serde(rename = "Histórico")]
    Historical,
    #[serde(rename = "Predicción")]
    Prediction,
}

impl SeriesKind {
    /// Legend label shown on charts.
    pub fn label(&self) -> &'static str {
        match self {
            SeriesKind::Historical => "Histórico",
            SeriesKind::Prediction => "Predicción",
        }
    }
}

/// One (year, €/m²) point of a price chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartPoint {
    pub year: i32,
    pub price_per_area: f64,
    pub kind: SeriesKind,
}

impl ChartPoint {
    pub fn new(year: i32, price_per_area: f64, kind: SeriesKind) -> Self {
        Self {
            year,
            price_per_area,
            kind,
        }
    }
}

/// Named line of a chart, e.g. the history of one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<ChartPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_kind_serializes_as_label() {
        let point = ChartPoint::new(2025, 3135.0, SeriesKind::Prediction);
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["kind"], "Predicción");
        assert_eq!(SeriesKind::Historical.label(), "Histórico");
    }
}
