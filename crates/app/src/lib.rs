//! Scholarship eligibility decision-support web application

pub mod config;
pub mod context;
pub mod logging;
pub mod server;
pub mod views;

pub use config::AppConfig;
pub use context::{AppContext, SharedContext};
pub use logging::init_logging;
pub use server::{build_router, start_server};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
