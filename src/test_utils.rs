use crate::config::{initialize_app_state, AppConfig};
use crate::router::create_router;
use crate::schemas::AppState;
use axum::Router;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn sample_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data/sample")
        .join(file)
}

/// Configuration pointing at the sample artifacts in `data/sample`.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::load(None).expect("Failed to load test configuration");
    config.data.model_path = sample_path("modelo_vivienda.json");
    config.data.history_path = sample_path("datos_historicos.csv");
    config.data.boundaries_path = sample_path("spain_communities.geojson");
    config
}

/// Create AppState for testing
pub fn setup_test_app_state_with(config: AppConfig) -> AppState {
    initialize_app_state(config).expect("Failed to initialize test state")
}

pub fn setup_test_app_state() -> AppState {
    setup_test_app_state_with(test_config())
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level is taken from RUST_LOG and defaults to WARN.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| match level.to_uppercase().as_str() {
            "ERROR" => Some(Level::ERROR),
            "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "TRACE" => Some(Level::TRACE),
            _ => None,
        })
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing
pub fn setup_test_app() -> Router {
    let _guard = init_test_tracing();
    create_router(setup_test_app_state())
}

/// App whose boundary file is missing, so the map is unavailable.
pub fn setup_test_app_without_map() -> Router {
    let _guard = init_test_tracing();
    let mut config = test_config();
    config.data.boundaries_path = sample_path("missing.geojson");
    create_router(setup_test_app_state_with(config))
}

/// App whose model was trained on "Castilla y León", a region with a
/// boundary but no rows in the historical dataset.
pub fn setup_test_app_with_unobserved_region() -> Router {
    let _guard = init_test_tracing();
    let mut config = test_config();
    config.data.model_path = sample_path("modelo_vivienda_castilla.json");
    create_router(setup_test_app_state_with(config))
}
