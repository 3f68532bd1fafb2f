use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const SETTINGS_FILE_NAME: &str = "config.toml";

/// Application settings, read from `config.toml` in the config directory.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppSettings {
    pub default_port: u16,
    /// Seconds to wait for the SSH handshake before giving up.
    pub connection_timeout: u64,
    /// External client used for interactive sessions.
    pub ssh_program: String,
    /// Passed through as `-o StrictHostKeyChecking=<value>` when set.
    pub strict_host_key_checking: Option<String>,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_port: 22,
            connection_timeout: 20,
            ssh_program: "ssh".to_string(),
            strict_host_key_checking: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from `<config_dir>/config.toml`, falling back to defaults
    /// when the file doesn't exist.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(SETTINGS_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let settings: AppSettings = toml::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.default_port == 0 {
            return Err(AppError::ConfigError(
                "default_port must be between 1 and 65535".to_string(),
            ));
        }
        if self.connection_timeout == 0 {
            return Err(AppError::ConfigError(
                "connection_timeout must be greater than 0".to_string(),
            ));
        }
        if self.ssh_program.trim().is_empty() {
            return Err(AppError::ConfigError(
                "ssh_program cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
