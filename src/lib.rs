use crate::config::PceConfig;
use crate::error::Result;

pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

pub use crate::domain::pce::engine::{Pce, PceOutcome};
pub use crate::error::{Error, PceError, PceResult};

/// Loads the engine configuration from `file_path` and installs the logger it describes.
pub fn load_config(file_path: &str) -> Result<PceConfig> {
    let config = PceConfig::from_file(file_path)?;

    logger::init(&config.logging);
    log::info!("Configuration loaded from '{}'. hop_margin = {}", file_path, config.hop_margin);

    Ok(config)
}
