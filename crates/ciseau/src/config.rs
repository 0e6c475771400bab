//! Configuration file loading for ciseau.
//!
//! Reads `ciseau.config.json` from the current working directory, or the
//! file given with `--config`.

use std::path::{Path, PathBuf};

use ciseau_atelier::TransformOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default configuration file name
pub const CONFIG_FILE: &str = "ciseau.config.json";

/// Top-level ciseau configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CiseauConfig {
    /// JSON Schema reference (for editor autocompletion).
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Codemods `run` applies when none are named on the command line
    /// (empty = every built-in codemod).
    #[serde(default)]
    pub codemods: Vec<String>,

    /// Options handed to every codemod (`printOptions`, `selfReference`,
    /// `componentBaseClass`, `componentModule`, `paths`).
    #[serde(flatten)]
    pub transform: TransformOptions,
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load the configuration.
///
/// An explicit path must exist and parse. Without one, `ciseau.config.json`
/// in `dir` (or the CWD) is optional, and a broken file only warns.
pub fn load_config(
    explicit: Option<&Path>,
    dir: Option<&Path>,
) -> Result<CiseauConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let base = dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let config_path = base.join(CONFIG_FILE);

    if !config_path.exists() {
        return Ok(CiseauConfig::default());
    }

    match read_config(&config_path) {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!("\x1b[33mWarning:\x1b[0m {e}");
            tracing::warn!(error = %e, "falling back to default configuration");
            Ok(CiseauConfig::default())
        }
    }
}

fn read_config(path: &Path) -> Result<CiseauConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
