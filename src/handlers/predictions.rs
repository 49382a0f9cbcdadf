use axum::{
    extract::{Query, State},
    response::Json,
};
use common::PredictionDto;
use compute::predictor::{PredictionRequest, PredictionTarget};
use tracing::{debug, info, instrument};

use crate::error::ApiError;
use crate::helpers::converters::prediction_to_dto;
use crate::schemas::{ApiResponse, AppState, CachedData, ErrorResponse, PredictionQuery};

/// Predicts one region, going through the payload cache.
pub(crate) async fn cached_prediction(
    state: &AppState,
    region: &str,
    target: PredictionTarget,
) -> Result<PredictionDto, ApiError> {
    let cache_key = format!("prediction_{}_{:?}", region, target);
    if let Some(CachedData::Prediction(prediction)) = state.cache.get(&cache_key).await {
        debug!("Prediction served from cache");
        return Ok(prediction);
    }

    let request = PredictionRequest::new(region, target);
    let result = state.context.predictor.predict_growth(&request)?;
    let prediction = prediction_to_dto(&result, &state.context);
    info!(
        "Predicted {:.2}% for {} in {}",
        prediction.predicted_growth_percent, prediction.region, prediction.target_year
    );

    state
        .cache
        .insert(cache_key, CachedData::Prediction(prediction.clone()))
        .await;
    Ok(prediction)
}

/// Predicted growth, projected price and chart series for one region
#[utoipa::path(
    get,
    path = "/api/v1/predictions",
    tag = "predictions",
    params(PredictionQuery),
    responses(
        (status = 200, description = "Prediction computed successfully", body = ApiResponse<PredictionDto>),
        (status = 400, description = "Invalid region or target", body = ErrorResponse),
        (status = 404, description = "Unknown region", body = ErrorResponse),
        (status = 422, description = "Not enough data to predict", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_prediction(
    Query(query): Query<PredictionQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PredictionDto>>, ApiError> {
    let target = query.target()?;
    let prediction = cached_prediction(&state, &query.region, target).await?;

    let message = if prediction.projection.no_data {
        "Prediction computed; no last price to project from".to_string()
    } else {
        "Prediction computed successfully".to_string()
    };

    Ok(Json(ApiResponse {
        data: prediction,
        message,
        success: true,
    }))
}
