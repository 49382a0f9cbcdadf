use axum::{
    extract::{Query, State},
    response::Json,
};
use common::ChartSeries;
use tracing::{debug, instrument};
use validator::Validate;

use crate::error::ApiError;
use crate::helpers::converters::history_series;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, HistoryQuery};

/// Historical €/m² series of one region, or of all regions
#[utoipa::path(
    get,
    path = "/api/v1/history",
    tag = "data",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<ChartSeries>>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 404, description = "Region not in the data", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_history(
    Query(query): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ChartSeries>>>, ApiError> {
    query.validate()?;
    let context = &state.context;

    if let Some(region) = query.region.as_deref() {
        if !context.dataset.contains_region(region) {
            return Err(ApiError::NotFound(format!(
                "region '{}' has no historical data",
                region
            )));
        }
    }

    let series = history_series(context, query.region.as_deref());
    debug!("Returning {} historical series", series.len());

    Ok(Json(ApiResponse {
        data: series,
        message: "History retrieved successfully".to_string(),
        success: true,
    }))
}
