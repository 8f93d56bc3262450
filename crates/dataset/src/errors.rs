use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while loading the applicant table.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read dataset {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read CSV header: {0}")]
    Header(#[source] csv::Error),

    #[error("dataset is missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("invalid record at data row {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("dataset contains no records")]
    Empty,
}
