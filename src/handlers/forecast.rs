use axum::{
    extract::{Query, State},
    response::Json,
};
use common::ForecastRowDto;
use compute::forecast::build_forecast;
use compute::predictor::PredictionTarget;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState, CachedData, ErrorResponse, ForecastQuery};

/// Forecast rows for all regions, or for one, going through the payload cache.
pub(crate) async fn cached_forecast(
    state: &AppState,
    target: PredictionTarget,
    region: Option<&str>,
) -> Result<Vec<ForecastRowDto>, ApiError> {
    let cache_key = format!("forecast_{:?}_{:?}", target, region);
    if let Some(CachedData::Forecast(rows)) = state.cache.get(&cache_key).await {
        debug!("Forecast served from cache");
        return Ok(rows);
    }

    let context = &state.context;
    let rows: Vec<ForecastRowDto> =
        build_forecast(context.predictor.as_ref(), &context.settings, target, region)?
            .iter()
            .map(ForecastRowDto::from)
            .collect();

    state
        .cache
        .insert(cache_key, CachedData::Forecast(rows.clone()))
        .await;
    Ok(rows)
}

/// Forecast table: growth, prices, confidence and recommendation per region
#[utoipa::path(
    get,
    path = "/api/v1/forecast",
    tag = "predictions",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Forecast computed successfully", body = ApiResponse<Vec<ForecastRowDto>>),
        (status = 400, description = "Invalid target", body = ErrorResponse),
        (status = 404, description = "Unknown region", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_forecast(
    Query(query): Query<ForecastQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ForecastRowDto>>>, ApiError> {
    let target = query.target()?;
    let rows = cached_forecast(&state, target, query.region.as_deref()).await?;

    Ok(Json(ApiResponse {
        data: rows,
        message: "Forecast computed successfully".to_string(),
        success: true,
    }))
}
