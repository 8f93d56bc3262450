//! Scholarship eligibility classifier
//!
//! Deterministic preprocessing + decision tree pipeline: one-hot encoding
//! of the categorical columns, passthrough of the numeric ones, a
//! depth-limited CART classifier, stratified train/test splitting and a
//! fingerprint-keyed model cache.

pub mod cart;
pub mod deterministic;
pub mod encoder;
pub mod errors;
pub mod pipeline;
pub mod split;
pub mod trainer;

use beasiswa_dataset::Dataset;
use std::path::Path;

pub use cart::{Tree, TreeConfig};
pub use deterministic::{LcgRng, SplitTieBreaker};
pub use encoder::{ColumnTransformer, Encoded, OneHotEncoder, UnknownCategory};
pub use errors::TrainerError;
pub use pipeline::{ClassProbability, Pipeline, Prediction};
pub use split::{stratified_split, TrainTestSplit};
pub use trainer::{ModelCache, ModelMetadata, ModelTrainer, TrainedModel, TrainingParams};

/// Train a model directly from a CSV file using the provided parameters.
pub fn train_model_from_csv(
    path: &Path,
    params: TrainingParams,
) -> Result<TrainedModel, TrainerError> {
    let dataset = Dataset::from_csv(path)?;
    ModelTrainer::new(params).train(&dataset)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
