use axum::{
    extract::{Query, State},
    response::Json,
};
use common::RegionGrowthDto;
use compute::predictor::PredictionTarget;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::helpers::converters::region_growth_to_dto;
use crate::schemas::{ApiResponse, AppState, CachedData, ErrorResponse, TargetQuery};

/// Growth of every region at `target`, joined with the map boundaries.
pub(crate) async fn cached_region_growth(
    state: &AppState,
    target: PredictionTarget,
) -> Result<RegionGrowthDto, ApiError> {
    let cache_key = format!("region_growth_{:?}", target);
    if let Some(CachedData::RegionGrowth(growth)) = state.cache.get(&cache_key).await {
        debug!("Region growth served from cache");
        return Ok(growth);
    }

    let table = state.context.predictor.predict_region_growth_table(target)?;
    let growth = region_growth_to_dto(&table, &state.context);

    state
        .cache
        .insert(cache_key, CachedData::RegionGrowth(growth.clone()))
        .await;
    Ok(growth)
}

/// Per-region predicted growth for the choropleth map
#[utoipa::path(
    get,
    path = "/api/v1/region-growth",
    tag = "predictions",
    params(TargetQuery),
    responses(
        (status = 200, description = "Region growth computed successfully", body = ApiResponse<RegionGrowthDto>),
        (status = 400, description = "Invalid target", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_region_growth(
    Query(query): Query<TargetQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RegionGrowthDto>>, ApiError> {
    let target = query.target()?;
    let growth = cached_region_growth(&state, target).await?;

    let message = if growth.map_available {
        "Region growth computed successfully".to_string()
    } else {
        "Region growth computed; map unavailable".to_string()
    };

    Ok(Json(ApiResponse {
        data: growth,
        message,
        success: true,
    }))
}
