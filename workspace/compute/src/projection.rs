//! Conversion of a predicted growth percentage into an absolute price.

use common::{ChartPoint, SeriesKind};
use model::entities::historical_record::HistoricalRecord;

/// Projected €/m² price, or an explicit marker that it cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Price(f64),
    /// No usable last price exists for the region.
    NoData,
}

impl Projection {
    pub fn price(&self) -> Option<f64> {
        match self {
            Projection::Price(price) => Some(*price),
            Projection::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Projection::NoData)
    }
}

/// Applies `growth_percent` to the last known price:
/// `last_price × (1 + growth_percent / 100)`.
///
/// A missing, non-positive or non-finite last price, or a non-finite growth,
/// yields `Projection::NoData` instead of a NaN.
pub fn project_price(last_price: Option<f64>, growth_percent: f64) -> Projection {
    match last_price {
        Some(last) if last > 0.0 && last.is_finite() && growth_percent.is_finite() => {
            Projection::Price(last + last * growth_percent / 100.0)
        }
        _ => Projection::NoData,
    }
}

/// Percentage change between two prices, `None` without a usable base price.
pub fn growth_between(base_price: Option<f64>, new_price: f64) -> Option<f64> {
    match base_price {
        Some(base) if base > 0.0 && base.is_finite() && new_price.is_finite() => {
            Some((new_price - base) / base * 100.0)
        }
        _ => None,
    }
}

/// The history of a region followed by the projected point, ready to chart.
/// The projected point is left out when the projection has no data.
pub fn projection_series(
    history: &[&HistoricalRecord],
    target_year: i32,
    projection: Projection,
) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = history
        .iter()
        .map(|r| ChartPoint::new(r.year, r.price_per_area, SeriesKind::Historical))
        .collect();
    if let Projection::Price(price) = projection {
        points.push(ChartPoint::new(target_year, price, SeriesKind::Prediction));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_formula() {
        assert_eq!(project_price(Some(100.0), 10.0), Projection::Price(110.0));
        assert_eq!(project_price(Some(100.0), -5.0), Projection::Price(95.0));
        assert_eq!(project_price(Some(3000.0), 4.5), Projection::Price(3135.0));
        assert_eq!(project_price(Some(250.0), 0.0), Projection::Price(250.0));

        for (last, growth) in [(1234.5, 3.3), (80.0, -12.5), (5000.0, 100.0)] {
            let price = project_price(Some(last), growth).price().unwrap();
            assert!((price - last * (1.0 + growth / 100.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_projection_without_last_price_is_no_data() {
        assert_eq!(project_price(None, 4.5), Projection::NoData);
        assert_eq!(project_price(Some(0.0), 4.5), Projection::NoData);
        assert_eq!(project_price(Some(-10.0), 4.5), Projection::NoData);
        assert_eq!(project_price(Some(f64::NAN), 4.5), Projection::NoData);
        assert_eq!(project_price(Some(100.0), f64::NAN), Projection::NoData);
        assert!(project_price(None, 1.0).price().is_none());
    }

    #[test]
    fn test_growth_between() {
        assert_eq!(growth_between(Some(100.0), 110.0), Some(10.0));
        assert_eq!(growth_between(Some(0.0), 110.0), None);
        assert_eq!(growth_between(None, 110.0), None);
    }

    #[test]
    fn test_projection_series() {
        let history = [
            HistoricalRecord::new("Madrid", 2022, 2900.0),
            HistoricalRecord::new("Madrid", 2023, 3000.0),
        ];
        let refs: Vec<&HistoricalRecord> = history.iter().collect();

        let points = projection_series(&refs, 2025, project_price(Some(3000.0), 4.5));
        assert_eq!(points.len(), 3);
        assert_eq!(points[2], ChartPoint::new(2025, 3135.0, SeriesKind::Prediction));
        assert!(points[..2].iter().all(|p| p.kind == SeriesKind::Historical));

        let without = projection_series(&refs, 2025, Projection::NoData);
        assert_eq!(without.len(), 2);
    }
}
