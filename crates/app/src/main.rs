//! Scholarship decision-support server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use beasiswa_app::{init_logging, start_server, AppConfig, AppContext};
use beasiswa_classifier::{ModelCache, ModelTrainer};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "beasiswa")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scholarship eligibility decision-support server", long_about = None)]
struct Args {
    /// Configuration file path (defaults to ./beasiswa.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())?;
    init_logging(&config)?;

    info!("Starting beasiswa v{}", beasiswa_app::VERSION);
    info!("Dataset: {}", config.data_path.display());

    let cache = ModelCache::new(ModelTrainer::new(config.training_params()));
    let addr = config.bind_addr();
    let ctx = AppContext::load(config, &cache).with_context(|| "Failed to prepare model")?;

    info!("Test accuracy: {:.2}%", ctx.model().accuracy * 100.0);

    start_server(Arc::new(ctx), &addr).await
}
