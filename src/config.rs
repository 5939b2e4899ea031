//! Settings file handling.
//!
//! Settings come from an optional JSON file and are then overridden by CLI flags.

use crate::error::ConfigError;
use crate::locale::Locale;
use crate::model::{NotificationConfig, SimConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulator: SimConfig,
    pub notifications: NotificationConfig,
    pub locale: Locale,
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulator.tick_interval == Duration::ZERO {
            return Err(ConfigError::ZeroTickInterval);
        }
        if !(1..=100).contains(&self.simulator.step) {
            return Err(ConfigError::StepOutOfRange {
                step: self.simulator.step,
            });
        }
        Ok(())
    }
}

/// `<config_dir>/forge-progress/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("forge-progress").join("config.json"))
}

/// Load settings from `path`, or from the default location when it exists.
///
/// An explicit path must exist; a missing default file just yields defaults.
pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(p) => read_settings(p),
        None => match default_config_path() {
            Some(p) if p.is_file() => read_settings(&p),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Settings::default())
            }
        },
    }
}

fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config file");
    Ok(settings)
}
