//! Shared application context
//!
//! Holds the loaded applicant table and the model fitted on it. Built once
//! at startup and handed to every request handler behind an `Arc`.

use std::sync::Arc;

use beasiswa_classifier::{ModelCache, Prediction, TrainedModel, TrainerError};
use beasiswa_dataset::{ApplicantFeatures, Dataset};
use tracing::info;

use crate::config::AppConfig;

pub type SharedContext = Arc<AppContext>;

#[derive(Debug)]
pub struct AppContext {
    config: AppConfig,
    dataset: Arc<Dataset>,
    model: Arc<TrainedModel>,
}

impl AppContext {
    /// Load the configured CSV and obtain its model from `cache`
    pub fn load(config: AppConfig, cache: &ModelCache) -> Result<Self, TrainerError> {
        let dataset = Dataset::from_csv(&config.data_path)?;
        Self::with_dataset(config, dataset, cache)
    }

    /// Build a context around an already loaded table
    pub fn with_dataset(
        config: AppConfig,
        dataset: Dataset,
        cache: &ModelCache,
    ) -> Result<Self, TrainerError> {
        let model = cache.get_or_train(&dataset)?;
        info!(
            rows = dataset.row_count(),
            accuracy = model.accuracy,
            fingerprint = %model.metadata.dataset_fingerprint,
            "application context ready"
        );

        Ok(Self {
            config,
            dataset: Arc::new(dataset),
            model,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn model_handle(&self) -> Arc<TrainedModel> {
        Arc::clone(&self.model)
    }

    pub fn predict(&self, input: &ApplicantFeatures) -> Result<Prediction, TrainerError> {
        self.model.pipeline.predict(input)
    }
}
