use axum::{extract::State, response::Json};
use model::entities::artifact::{TargetKind, TimeFeatureKind};
use tracing::{debug, instrument};

use crate::schemas::{ApiResponse, AppState, RegionsResponse};

/// Regions, selectable years and model metadata
#[utoipa::path(
    get,
    path = "/api/v1/regions",
    tag = "data",
    responses(
        (status = 200, description = "Regions retrieved successfully", body = ApiResponse<RegionsResponse>)
    )
)]
#[instrument(skip(state))]
pub async fn get_regions(State(state): State<AppState>) -> Json<ApiResponse<RegionsResponse>> {
    let context = &state.context;
    let regions = context.regions.clone();
    debug!("Listing {} regions", regions.len());

    let time_feature_kind = match context.artifact.time_feature.kind {
        TimeFeatureKind::Year => "year",
        TimeFeatureKind::Horizon => "horizon",
    };
    let target_kind = match context.artifact.target {
        TargetKind::GrowthPercent => "growth_percent",
        TargetKind::PricePerArea => "price_per_area",
    };

    let data = RegionsResponse {
        regions,
        first_year: context.first_year,
        last_year: context.last_year,
        min_target_year: context.min_target_year(),
        max_target_year: context.max_target_year(),
        max_horizon: context.config.prediction.max_horizon,
        time_feature_kind: time_feature_kind.to_string(),
        target_kind: target_kind.to_string(),
        model_description: context.artifact.description.clone(),
        fit_score: context.fit_score,
        map_available: context.boundaries.is_some(),
        map_message: context.map_message.clone(),
        join_report: context.join_report.clone(),
    };

    Json(ApiResponse {
        data,
        message: "Regions retrieved successfully".to_string(),
        success: true,
    })
}
