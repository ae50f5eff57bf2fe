use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loader::parser::parse_json_file;

/// Number of links an enumerated path may exceed the shortest-by-metric path.
pub const DEFAULT_HOP_MARGIN: usize = 15;

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "pce.log";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Tunables of the path computation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PceConfig {
    /// Extra links allowed on top of the shortest path during all-paths enumeration.
    pub hop_margin: usize,

    pub logging: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogConfig {
    pub log_dir: String,
    pub log_file: String,

    /// Used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for PceConfig {
    fn default() -> Self {
        Self { hop_margin: DEFAULT_HOP_MARGIN, logging: LogConfig::default() }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { log_dir: DEFAULT_LOG_DIR.to_string(), log_file: DEFAULT_LOG_FILE.to_string(), level: DEFAULT_LOG_LEVEL.to_string() }
    }
}

impl PceConfig {
    /// Loads the configuration from a JSON file. Missing fields fall back to their defaults.
    pub fn from_file(file_path: &str) -> Result<Self> {
        let config: PceConfig = parse_json_file(file_path)?;
        log::debug!("PceConfig loaded from '{}': hop_margin {}", file_path, config.hop_margin);

        Ok(config)
    }
}
