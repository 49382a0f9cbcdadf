//! Data model of the housing dashboard: the historical price series, the
//! geographic boundaries and the persisted estimator artifact.

pub mod entities;
pub mod error;

pub use error::{ModelError, Result};
