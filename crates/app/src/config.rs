//! Application configuration
//!
//! Layered as built-in defaults, then an optional TOML file, then
//! `BEASISWA_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use beasiswa_classifier::TrainingParams;
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;

/// File looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "beasiswa.toml";

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
    pub max_depth: usize,
    pub test_size: f64,
    pub seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let params = TrainingParams::default();
        Self {
            data_path: PathBuf::from("data/data_beasiswa.csv"),
            host: "127.0.0.1".to_string(),
            port: 8501,
            log_level: "info".to_string(),
            log_format: "compact".to_string(),
            max_depth: params.max_depth,
            test_size: params.test_size,
            seed: params.seed,
        }
    }
}

impl AppConfig {
    pub fn load(config_path_override: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("data_path", defaults.data_path.display().to_string())?
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", defaults.log_format)?
            .set_default("max_depth", defaults.max_depth as i64)?
            .set_default("test_size", defaults.test_size)?
            .set_default("seed", defaults.seed as i64)?;

        if let Some(path) = config_path_override {
            if !path.exists() {
                anyhow::bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            builder = builder.add_source(ConfigFile::from(path));
        } else {
            builder = builder.add_source(ConfigFile::with_name(DEFAULT_CONFIG_FILE).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("BEASISWA").try_parsing(true));

        let config: AppConfig = builder
            .build()?
            .try_deserialize()
            .context("invalid configuration")?;
        Ok(config)
    }

    pub fn training_params(&self) -> TrainingParams {
        TrainingParams {
            max_depth: self.max_depth,
            test_size: self.test_size,
            seed: self.seed,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
