use crate::schemas::{ApiResponse, ErrorResponse, HealthResponse, RegionsResponse};
use crate::test_utils::{
    setup_test_app, setup_test_app_with_unobserved_region, setup_test_app_without_map,
};
use axum::http::StatusCode;
use axum_test::TestServer;
use common::{CellStatus, ForecastRowDto, PredictionDto, RegionGrowthDto, SeriesKind};

fn server() -> TestServer {
    TestServer::new(setup_test_app()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = server();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::OK);
    let body: HealthResponse = response.json();
    assert_eq!(body.status, "healthy");
    assert_eq!(body.model, "linear");
    assert_eq!(body.regions, 6);
    assert_eq!(body.map, "available");
}

#[tokio::test]
async fn test_regions_and_join_report() {
    let server = server();

    let response = server.get("/api/v1/regions").await;

    response.assert_status(StatusCode::OK);
    let body: ApiResponse<RegionsResponse> = response.json();
    assert!(body.success);
    let data = body.data;
    assert_eq!(data.regions.len(), 6);
    assert!(data.regions.contains(&"País Vasco".to_string()));
    assert_eq!(data.last_year, 2023);
    assert_eq!(data.first_year, 2019);
    assert_eq!(data.min_target_year, 2024);
    assert_eq!(data.max_target_year, 2030);
    assert_eq!(data.time_feature_kind, "year");
    assert_eq!(data.target_kind, "growth_percent");
    assert!(data.fit_score.is_some());
    assert!(data.map_available);

    let report = data.join_report.unwrap();
    assert_eq!(report.matched.len(), 6);
    assert_eq!(report.boundary_only, vec!["Castilla y León".to_string()]);
    assert!(report.dataset_only.is_empty());
}

#[tokio::test]
async fn test_history() {
    let server = server();

    let all: ApiResponse<Vec<common::ChartSeries>> = server.get("/api/v1/history").await.json();
    assert_eq!(all.data.len(), 6);

    let response = server
        .get("/api/v1/history")
        .add_query_param("region", "Madrid")
        .await;
    response.assert_status(StatusCode::OK);
    let madrid: ApiResponse<Vec<common::ChartSeries>> = response.json();
    assert_eq!(madrid.data.len(), 1);
    let points = &madrid.data[0].points;
    assert_eq!(points.len(), 5);
    assert_eq!(points.last().unwrap().year, 2023);
    assert_eq!(points.last().unwrap().price_per_area, 3037.9);

    let missing = server
        .get("/api/v1/history")
        .add_query_param("region", "Castilla y León")
        .await;
    missing.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_prediction_for_madrid() {
    let server = server();

    let response = server
        .get("/api/v1/predictions")
        .add_query_param("region", "Madrid")
        .add_query_param("year", 2025)
        .await;

    response.assert_status(StatusCode::OK);
    let body: ApiResponse<PredictionDto> = response.json();
    let prediction = body.data;
    assert_eq!(prediction.target_year, 2025);
    assert_eq!(prediction.horizon, 2);
    assert!((prediction.predicted_growth_percent - 4.5).abs() < 1e-9);

    let projected = prediction.projection.projected_price.unwrap();
    assert!((projected - 3037.9 * 1.045).abs() < 1e-6);
    assert!(!prediction.projection.no_data);
    assert_eq!(prediction.projection.last_year, Some(2023));

    let confidence = prediction.confidence.unwrap();
    assert!((confidence - 1.0 / 1.1).abs() < 1e-12);
    assert!(prediction.confidence_note.unwrap().contains("ilustrativo"));

    let range = prediction.growth_range.unwrap();
    assert!((range.lower - 3.0).abs() < 1e-9);
    assert!((range.upper - 6.0).abs() < 1e-9);

    let last = prediction.series.last().unwrap();
    assert_eq!(last.year, 2025);
    assert_eq!(last.kind, SeriesKind::Prediction);
    assert_eq!(prediction.series.len(), 6);
}

#[tokio::test]
async fn test_prediction_by_horizon_matches_year() {
    let server = server();

    let by_year: ApiResponse<PredictionDto> = server
        .get("/api/v1/predictions")
        .add_query_param("region", "Galicia")
        .add_query_param("year", 2026)
        .await
        .json();
    let by_horizon: ApiResponse<PredictionDto> = server
        .get("/api/v1/predictions")
        .add_query_param("region", "Galicia")
        .add_query_param("horizon", 3)
        .await
        .json();

    assert_eq!(by_year.data, by_horizon.data);
}

#[tokio::test]
async fn test_prediction_rejects_bad_targets() {
    let server = server();

    for query in [
        vec![("region", "Madrid")],
        vec![("region", "Madrid"), ("year", "2025"), ("horizon", "2")],
        vec![("region", "Madrid"), ("year", "2023")],
        vec![("region", "Madrid"), ("year", "2031")],
        vec![("region", ""), ("year", "2025")],
    ] {
        let mut request = server.get("/api/v1/predictions");
        for (key, value) in &query {
            request = request.add_query_param(key, value);
        }
        let response = request.await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: ErrorResponse = response.json();
        assert_eq!(error.code, "invalid_request", "{:?}", query);
        assert!(!error.success);
    }
}

#[tokio::test]
async fn test_prediction_unknown_region() {
    let server = server();

    let response = server
        .get("/api/v1/predictions")
        .add_query_param("region", "Atlántida")
        .add_query_param("year", 2025)
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let error: ErrorResponse = response.json();
    assert_eq!(error.code, "not_found");
    assert!(error.error.contains("Atlántida"));
}

#[tokio::test]
async fn test_region_growth_marks_boundary_only_region_as_no_data() {
    let server = server();

    let response = server
        .get("/api/v1/region-growth")
        .add_query_param("year", 2025)
        .await;

    response.assert_status(StatusCode::OK);
    let body: ApiResponse<RegionGrowthDto> = response.json();
    let growth = body.data;
    assert!(growth.map_available);
    assert_eq!(growth.cells.len(), 7);

    let castilla = growth
        .cells
        .iter()
        .find(|c| c.region == "Castilla y León")
        .unwrap();
    assert_eq!(castilla.status, CellStatus::NoData);
    assert_eq!(castilla.growth_percent, None);

    let madrid = growth.cells.iter().find(|c| c.region == "Madrid").unwrap();
    assert_eq!(madrid.status, CellStatus::Predicted);
    assert!((madrid.growth_percent.unwrap() - 4.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_region_growth_without_map() {
    let server = TestServer::new(setup_test_app_without_map()).unwrap();

    let response = server
        .get("/api/v1/region-growth")
        .add_query_param("horizon", 1)
        .await;

    response.assert_status(StatusCode::OK);
    let body: ApiResponse<RegionGrowthDto> = response.json();
    assert!(!body.data.map_available);
    assert!(body.data.map_message.unwrap().contains("Mapa no disponible"));
    assert_eq!(body.data.cells.len(), 6);
    assert!(body.data.cells.iter().all(|c| c.status == CellStatus::NotOnMap));
}

#[tokio::test]
async fn test_forecast_table() {
    let server = server();

    let response = server
        .get("/api/v1/forecast")
        .add_query_param("year", 2025)
        .await;

    response.assert_status(StatusCode::OK);
    let body: ApiResponse<Vec<ForecastRowDto>> = response.json();
    assert_eq!(body.data.len(), 6);
    assert!(body.data.iter().all(|r| r.year == 2025));
    assert!(body
        .data
        .iter()
        .all(|r| r.recommendation.as_deref() == Some("Venta")));

    let single: ApiResponse<Vec<ForecastRowDto>> = server
        .get("/api/v1/forecast")
        .add_query_param("year", 2025)
        .add_query_param("region", "Galicia")
        .await
        .json();
    assert_eq!(single.data.len(), 1);
    assert_eq!(single.data[0].region, "Galicia");
}

#[tokio::test]
async fn test_forecast_defaults_to_next_year() {
    let server = server();

    let body: ApiResponse<Vec<ForecastRowDto>> = server.get("/api/v1/forecast").await.json();
    assert!(body.data.iter().all(|r| r.year == 2024));
}

#[tokio::test]
async fn test_forecast_xlsx_download() {
    let server = server();

    let response = server
        .get("/api/v1/exports/forecast.xlsx")
        .add_query_param("year", 2025)
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        "attachment; filename=\"predicciones_2025.xlsx\""
    );
    let bytes = response.as_bytes();
    assert!(bytes.starts_with(b"PK\x03\x04"));
}

#[tokio::test]
async fn test_forecast_csv_download() {
    let server = server();

    let response = server
        .get("/api/v1/exports/forecast.csv")
        .add_query_param("year", 2025)
        .await;

    response.assert_status(StatusCode::OK);
    let content_type = response.header("content-type");
    assert!(content_type.to_str().unwrap().starts_with("text/csv"));
    let disposition = response.header("content-disposition");
    assert!(disposition
        .to_str()
        .unwrap()
        .contains("prevision_vivienda_2025.csv"));

    let text = response.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 7);
    assert!(lines[0].starts_with("Comunidad,Año"));
    assert!(lines.iter().any(|l| l.starts_with("Madrid,2025")));
}

#[tokio::test]
async fn test_projection_png_download() {
    let server = server();

    let response = server
        .get("/api/v1/exports/projection.png")
        .add_query_param("region", "País Vasco")
        .add_query_param("year", 2025)
        .await;

    response.assert_status(StatusCode::OK);
    assert_eq!(response.header("content-type").to_str().unwrap(), "image/png");
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        "attachment; filename=\"proyeccion_Pa_s_Vasco_2025.png\""
    );
    assert!(response.as_bytes().starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[tokio::test]
async fn test_unobserved_region_prediction_has_no_projection() {
    let server = TestServer::new(setup_test_app_with_unobserved_region()).unwrap();

    let response = server
        .get("/api/v1/predictions")
        .add_query_param("region", "Castilla y León")
        .add_query_param("year", 2025)
        .await;

    response.assert_status(StatusCode::OK);
    let prediction = response.json::<ApiResponse<PredictionDto>>().data;
    assert!((prediction.predicted_growth_percent - 3.9).abs() < 1e-9);
    assert!(prediction.projection.no_data);
    assert_eq!(prediction.projection.projected_price, None);
    assert_eq!(prediction.projection.last_price, None);
    assert_eq!(prediction.projection.display, "Sin datos");
    assert!(prediction.series.is_empty());

    let chart = server
        .get("/api/v1/exports/projection.png")
        .add_query_param("region", "Castilla y León")
        .add_query_param("year", 2025)
        .await;
    chart.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(chart.json::<ErrorResponse>().code, "no_data");
}

#[tokio::test]
async fn test_dashboard_unobserved_region_shows_no_data() {
    let server = TestServer::new(setup_test_app_with_unobserved_region()).unwrap();

    let response = server
        .get("/")
        .add_query_param("region", "Castilla y León")
        .add_query_param("year", 2025)
        .await;

    response.assert_status(StatusCode::OK);
    let html = response.text();
    assert!(html.contains("<option value=\"Castilla y León\" selected>"));
    assert!(html.contains("Predicción para Castilla y León en 2025"));
    assert!(html.contains("3.90%"));
    assert!(html.contains("Precio proyectado en 2025: <strong>Sin datos</strong>"));
    assert!(!html.contains("Último precio conocido"));
    assert!(!html.contains("/api/v1/exports/projection.png"));
}

#[tokio::test]
async fn test_dashboard_page() {
    let server = server();

    let response = server.get("/").await;

    response.assert_status(StatusCode::OK);
    let html = response.text();
    assert!(html.contains("<form"));
    assert!(html.contains("Todas"));
    assert!(html.contains("Previsión para todas las comunidades en 2024"));
    assert!(html.contains("id=\"historico\""));
    assert!(html.contains("id=\"mapa\""));
    assert!(html.contains("href=\"/api/v1/exports/forecast.xlsx?year=2024\""));
    assert!(html.contains("Descargar tabla (Excel)"));
    assert!(html.contains("href=\"/api/v1/exports/forecast.csv?year=2024\""));
}

#[tokio::test]
async fn test_dashboard_prediction() {
    let server = server();

    let response = server
        .get("/")
        .add_query_param("region", "Madrid")
        .add_query_param("year", 2025)
        .await;

    response.assert_status(StatusCode::OK);
    let html = response.text();
    assert!(html.contains("Predicción para Madrid en 2025"));
    assert!(html.contains("4.50%"));
    assert!(html.contains("El aumento podría variar entre 3.00% y 6.00%."));
    assert!(html.contains("id=\"proyeccion\""));
    assert!(html.contains(
        "href=\"/api/v1/exports/projection.png?region=Madrid&amp;year=2025\""
    ));
    assert!(html.contains("Descargar gráfico (PNG)"));
}

#[tokio::test]
async fn test_dashboard_shows_errors_and_keeps_rendering() {
    let server = TestServer::new(setup_test_app_without_map()).unwrap();

    let response = server
        .get("/")
        .add_query_param("region", "Madrid")
        .add_query_param("year", 2031)
        .await;

    response.assert_status(StatusCode::OK);
    let html = response.text();
    assert!(html.contains("class=\"alert\""));
    assert!(html.contains("2031"));
    assert!(html.contains("Mapa no disponible"));
    assert!(html.contains("Predicción para Madrid en 2024"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let server = server();

    let response = server.get("/api-docs/openapi.json").await;

    response.assert_status(StatusCode::OK);
    let document: serde_json::Value = response.json();
    assert!(document["paths"]["/api/v1/predictions"].is_object());
}
