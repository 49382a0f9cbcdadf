//! Root of the data model. Everything in here is loaded once at startup and
//! treated as read-only for the lifetime of the process.

pub mod artifact;
pub mod boundary;
pub mod estimator;
pub mod historical_dataset;
pub mod historical_record;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::artifact::{ModelArtifact, TargetKind, TimeFeature, TimeFeatureKind};
    pub use super::boundary::BoundaryCollection;
    pub use super::estimator::{Estimator, EstimatorKind};
    pub use super::historical_dataset::{ColumnMapping, HistoricalDataset};
    pub use super::historical_record::HistoricalRecord;
}
