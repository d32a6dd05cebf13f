//! Configuration for wp-composer
//!
//! Handles the optional ~/.wp-composer/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::registry::RegistryConfig;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Manifest file used when `--file` is not given
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Base directory written into `extra.installer-paths` on every save,
    /// e.g. "wp-content"
    #[serde(default)]
    pub installer_path: Option<String>,

    #[serde(default)]
    pub registry: RegistryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_file: default_manifest_file(),
            installer_path: None,
            registry: RegistryConfig::default(),
        }
    }
}

fn default_manifest_file() -> String {
    "composer.json".to_string()
}

/// Returns the path to the wp-composer home directory (~/.wp-composer)
pub fn config_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".wp-composer"))
}

/// Load configuration from disk, falling back to defaults when the config
/// file does not exist
pub fn load_config() -> Result<Config> {
    let path = config_home()?.join("config.toml");
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(&path).context("Failed to read config.toml")?;
    toml::from_str(&content).context("Failed to parse config.toml")
}
