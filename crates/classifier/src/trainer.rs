//! Model trainer
//!
//! Splits the applicant table 80/20 with stratification, fits the pipeline
//! on the training partition and scores it on the held-out partition.

use std::sync::Arc;

use beasiswa_dataset::{ApplicantRecord, Dataset, Fingerprint};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cart::TreeConfig;
use crate::errors::TrainerError;
use crate::pipeline::Pipeline;
use crate::split::stratified_split;

/// Trainer configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    pub max_depth: usize,
    pub test_size: f64,
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            max_depth: 5,
            test_size: 0.2,
            seed: 42,
        }
    }
}

impl TrainingParams {
    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            ..TreeConfig::default()
        }
    }
}

/// Facts about a fitted model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub dataset_fingerprint: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub tree_depth: usize,
    pub leaf_count: usize,
    pub node_count: usize,
    pub feature_names: Vec<String>,
    pub model_hash: String,
    pub params: TrainingParams,
    pub trained_at: DateTime<Utc>,
}

/// Fitted pipeline with its held-out accuracy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainedModel {
    pub pipeline: Pipeline,
    /// Fraction of test rows predicted correctly, in [0, 1]
    pub accuracy: f64,
    pub metadata: ModelMetadata,
}

/// Model trainer
#[derive(Clone, Debug, Default)]
pub struct ModelTrainer {
    params: TrainingParams,
}

impl ModelTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    /// Train and score a pipeline on the given dataset
    pub fn train(&self, dataset: &Dataset) -> Result<TrainedModel, TrainerError> {
        let records = dataset.records();
        let labels = dataset.labels();

        let classes: Vec<String> = dataset.label_counts().into_keys().collect();
        let targets: Vec<usize> = labels
            .iter()
            .map(|label| classes.partition_point(|c| c.as_str() < *label))
            .collect();

        let split = stratified_split(&targets, &classes, self.params.test_size, self.params.seed)?;

        let (train_rows, train_labels) = select(records, &labels, &split.train);
        let (test_rows, test_labels) = select(records, &labels, &split.test);

        info!(
            train = train_rows.len(),
            test = test_rows.len(),
            max_depth = self.params.max_depth,
            seed = self.params.seed,
            "fitting decision tree pipeline"
        );

        let pipeline = Pipeline::fit(&train_rows, &train_labels, self.params.tree_config())?;
        let accuracy = pipeline.score(&test_rows, &test_labels)?;

        let tree = pipeline.tree();
        let metadata = ModelMetadata {
            dataset_fingerprint: dataset.fingerprint().to_hex(),
            train_rows: train_rows.len(),
            test_rows: test_rows.len(),
            tree_depth: tree.depth(),
            leaf_count: tree.leaf_count(),
            node_count: tree.node_count(),
            feature_names: pipeline.feature_names(),
            model_hash: pipeline.model_hash()?,
            params: self.params.clone(),
            trained_at: Utc::now(),
        };

        info!(
            accuracy,
            depth = metadata.tree_depth,
            leaves = metadata.leaf_count,
            hash = %metadata.model_hash,
            "training complete"
        );

        Ok(TrainedModel {
            pipeline,
            accuracy,
            metadata,
        })
    }
}

fn select<'a>(
    records: &'a [ApplicantRecord],
    labels: &[&'a str],
    indices: &[usize],
) -> (Vec<&'a ApplicantRecord>, Vec<&'a str>) {
    indices.iter().map(|&i| (&records[i], labels[i])).unzip()
}

/// Single-slot memo of the trained model, keyed on the table fingerprint.
///
/// Retrains only when a structurally different table is supplied.
#[derive(Debug, Default)]
pub struct ModelCache {
    trainer: ModelTrainer,
    slot: Mutex<Option<(Fingerprint, Arc<TrainedModel>)>>,
}

impl ModelCache {
    pub fn new(trainer: ModelTrainer) -> Self {
        Self {
            trainer,
            slot: Mutex::new(None),
        }
    }

    pub fn get_or_train(&self, dataset: &Dataset) -> Result<Arc<TrainedModel>, TrainerError> {
        let fingerprint = dataset.fingerprint();
        let mut slot = self.slot.lock();

        if let Some((cached, model)) = slot.as_ref() {
            if *cached == fingerprint {
                return Ok(Arc::clone(model));
            }
            info!(
                previous = %cached,
                current = %fingerprint,
                "dataset changed, retraining"
            );
        }

        let model = Arc::new(self.trainer.train(dataset)?);
        *slot = Some((fingerprint, Arc::clone(&model)));
        Ok(model)
    }

    /// Fingerprint of the table behind the cached model, if any
    pub fn cached_fingerprint(&self) -> Option<Fingerprint> {
        self.slot.lock().as_ref().map(|(fp, _)| *fp)
    }
}
