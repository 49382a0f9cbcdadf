use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use compute::forecast::{build_forecast, forecast_csv, forecast_xlsx, ForecastRow};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::handlers::predictions::cached_prediction;
use crate::helpers::chart_image::projection_png;
use crate::schemas::{AppState, ErrorResponse, ForecastQuery, PredictionQuery};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// `Content-Disposition` value; header values must be plain ASCII.
fn attachment(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

fn forecast_rows(state: &AppState, query: &ForecastQuery) -> Result<(i32, Vec<ForecastRow>), ApiError> {
    let context = &state.context;
    let target = query.target()?;
    let rows = build_forecast(
        context.predictor.as_ref(),
        &context.settings,
        target,
        query.region.as_deref(),
    )?;
    let year = match rows.first() {
        Some(row) => row.year,
        None => context.resolve_target(target)?.year,
    };
    info!("Exporting forecast for {} with {} rows", year, rows.len());
    Ok((year, rows))
}

/// Forecast table as an Excel workbook (sheet "Predicciones")
#[utoipa::path(
    get,
    path = "/api/v1/exports/forecast.xlsx",
    tag = "exports",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Excel workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", body = Vec<u8>),
        (status = 400, description = "Invalid target", body = ErrorResponse),
        (status = 404, description = "Unknown region", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn export_forecast_xlsx(
    Query(query): Query<ForecastQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let (year, rows) = forecast_rows(&state, &query)?;
    let body = forecast_xlsx(&rows)?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                attachment(&format!("predicciones_{}.xlsx", year)),
            ),
        ],
        body,
    ))
}

/// Forecast table as CSV
#[utoipa::path(
    get,
    path = "/api/v1/exports/forecast.csv",
    tag = "exports",
    params(ForecastQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid target", body = ErrorResponse),
        (status = 404, description = "Unknown region", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn export_forecast_csv(
    Query(query): Query<ForecastQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let (year, rows) = forecast_rows(&state, &query)?;
    let body = forecast_csv(&rows)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                attachment(&format!("prevision_vivienda_{}.csv", year)),
            ),
        ],
        body,
    ))
}

/// Projection chart as a PNG image
#[utoipa::path(
    get,
    path = "/api/v1/exports/projection.png",
    tag = "exports",
    params(PredictionQuery),
    responses(
        (status = 200, description = "PNG chart", content_type = "image/png", body = Vec<u8>),
        (status = 400, description = "Invalid region or target", body = ErrorResponse),
        (status = 404, description = "Unknown region", body = ErrorResponse),
        (status = 422, description = "Region without history to draw", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn export_projection_png(
    Query(query): Query<PredictionQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let target = query.target()?;
    let prediction = cached_prediction(&state, &query.region, target).await?;
    if prediction.series.is_empty() {
        return Err(ApiError::NoData(format!(
            "no history to draw for {}",
            prediction.region
        )));
    }
    let image = projection_png(&prediction.region, &prediction.series)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    info!(
        "Exporting projection chart for {} in {}",
        prediction.region, prediction.target_year
    );

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                attachment(&format!(
                    "proyeccion_{}_{}.png",
                    prediction.region,
                    prediction.target_year
                )),
            ),
        ],
        image,
    ))
}
