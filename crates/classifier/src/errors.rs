use beasiswa_dataset::DatasetError;
use thiserror::Error;

/// Errors returned while fitting or applying the pipeline.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("column {0:?} is missing or has the wrong type")]
    MissingColumn(String),

    #[error("target column has {found} distinct class(es), at least 2 are required")]
    TooFewClasses { found: usize },

    #[error("class {label:?} has {count} member(s), stratified split needs at least 2")]
    ClassTooSmall { label: String, count: usize },

    #[error("invalid train/test split: {0}")]
    InvalidSplit(String),

    #[error("got {rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
