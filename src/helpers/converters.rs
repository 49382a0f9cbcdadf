use common::{
    format_price_eur, CellStatus, ChartPoint, ChartSeries, GrowthRangeDto, MapCellDto,
    PredictionDto, ProjectionDto, RegionGrowthDto, SeriesKind,
};
use compute::confidence::CONFIDENCE_NOTE;
use compute::predictor::PredictionResult;
use compute::projection::projection_series;
use compute::region_growth::RegionGrowthTable;

use crate::context::AppContext;

/// Converts a prediction into its API payload, chart series included.
pub fn prediction_to_dto(result: &PredictionResult, context: &AppContext) -> PredictionDto {
    let history = context.dataset.records_for(&result.region);
    let series = projection_series(&history, result.target.year, result.projection);

    PredictionDto {
        region: result.region.clone(),
        target_year: result.target.year,
        horizon: result.target.horizon,
        predicted_growth_percent: result.predicted_growth_percent,
        confidence: result.confidence,
        confidence_note: result.confidence.map(|_| CONFIDENCE_NOTE.to_string()),
        growth_range: result.growth_range.map(|range| GrowthRangeDto {
            lower: range.lower,
            upper: range.upper,
        }),
        projection: ProjectionDto {
            last_year: result.last_year,
            last_price: result.last_price,
            projected_price: result.projection.price(),
            no_data: result.projection.is_no_data(),
            display: format_price_eur(result.projection.price()),
        },
        series,
    }
}

/// Joins the table with the boundaries, or lists every region as off-map
/// when no boundary file is loaded.
pub fn region_growth_to_dto(table: &RegionGrowthTable, context: &AppContext) -> RegionGrowthDto {
    let cells = match &context.boundaries {
        Some(boundaries) => table.join_with_boundaries(boundaries),
        None => table
            .entries()
            .iter()
            .map(|(region, entry)| MapCellDto {
                region: region.clone(),
                status: CellStatus::NotOnMap,
                growth_percent: entry.growth_percent(),
                projected_price: entry.projected_price(),
                reason: context.map_message.clone(),
            })
            .collect(),
    };

    RegionGrowthDto {
        target_year: table.target().year,
        horizon: table.target().horizon,
        cells,
        map_available: context.boundaries.is_some(),
        map_message: context.map_message.clone(),
    }
}

/// Historical series of one region, or of all regions when `region` is `None`.
pub fn history_series(context: &AppContext, region: Option<&str>) -> Vec<ChartSeries> {
    let regions = match region {
        Some(region) => vec![region.to_string()],
        None => context.dataset.regions(),
    };
    regions
        .into_iter()
        .map(|name| {
            let points = context
                .dataset
                .records_for(&name)
                .into_iter()
                .map(|r| ChartPoint::new(r.year, r.price_per_area, SeriesKind::Historical))
                .collect();
            ChartSeries { name, points }
        })
        .collect()
}
