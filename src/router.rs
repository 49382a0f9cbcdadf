use crate::handlers::{
    dashboard::dashboard,
    exports::{export_forecast_csv, export_forecast_xlsx, export_projection_png},
    forecast::get_forecast,
    health::health_check,
    history::get_history,
    predictions::get_prediction,
    region_growth::get_region_growth,
    regions::get_regions,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{routing::get, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.context.config.server.request_timeout_secs);

    Router::new()
        // Dashboard page
        .route("/", get(dashboard))
        // Health check
        .route("/health", get(health_check))
        // Data routes
        .route("/api/v1/regions", get(get_regions))
        .route("/api/v1/history", get(get_history))
        // Prediction routes
        .route("/api/v1/predictions", get(get_prediction))
        .route("/api/v1/region-growth", get(get_region_growth))
        .route("/api/v1/forecast", get(get_forecast))
        // Downloads
        .route("/api/v1/exports/forecast.xlsx", get(export_forecast_xlsx))
        .route("/api/v1/exports/forecast.csv", get(export_forecast_csv))
        .route("/api/v1/exports/projection.png", get(export_projection_png))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
