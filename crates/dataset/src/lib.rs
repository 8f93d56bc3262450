//! Scholarship applicant dataset
//!
//! Fixed-schema applicant records and the CSV loader that produces the
//! immutable training table.

pub mod dataset;
pub mod errors;
pub mod schema;

pub use dataset::{Dataset, Fingerprint, NumericStats};
pub use errors::DatasetError;
pub use schema::{
    ApplicantFeatures, ApplicantRecord, FeatureRow, CATEGORICAL_COLUMNS, FEATURE_COLUMNS,
    NEGATIVE_LABEL, NUMERIC_COLUMNS, POSITIVE_LABEL, SCHEMA_COLUMNS, TARGET_COLUMN,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
