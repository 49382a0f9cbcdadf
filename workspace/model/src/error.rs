use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or evaluating the persisted artifacts.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A configured file does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Reading a file failed for another reason.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON artifact or GeoJSON could not be parsed.
    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Error from Polars while reading or shaping the historical dataset.
    #[error("DataFrame error: {0}")]
    DataFrame(#[from] polars::error::PolarsError),

    /// The historical dataset does not have the expected columns or values.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// The model artifact is internally inconsistent.
    #[error("Invalid model artifact: {0}")]
    Artifact(String),

    /// The tabular input does not match the estimator's training-time columns.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The boundary file is not a usable FeatureCollection.
    #[error("Invalid boundary file: {0}")]
    Boundary(String),
}

impl ModelError {
    /// Maps an I/O error to `NotFound` when the file is missing.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ModelError::NotFound(path)
        } else {
            ModelError::Io { path, source }
        }
    }

    /// True when the error only means the file is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound(_))
    }
}

/// Type alias for Result with ModelError
pub type Result<T> = std::result::Result<T, ModelError>;
