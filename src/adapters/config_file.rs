//! JSON config file adapter.
//!
//! Implements [`ConfigPort`] over a file on disk.  Fields absent from the
//! file keep their defaults.  Range checks wait until the environment and
//! CLI layers have been applied on top.

use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::ConfigPort;
use crate::config::{ConfigError, SystemConfig};

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(self.path.clone()),
            _ => ConfigError::IoError(e),
        })?;
        let config: SystemConfig = serde_json::from_slice(&bytes).map_err(ConfigError::Corrupted)?;
        info!("Config loaded from {}", self.path.display());
        Ok(config)
    }
}
