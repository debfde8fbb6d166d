use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/promptcanvas/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("promptcanvas").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    /// - Returns an error if reading, parsing, or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Config::default());
        }

        Self::load_from(&path)
    }

    /// Loads and validates configuration from an explicit path.
    ///
    /// Unlike [`Config::load`], the file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The bind address parses as `host:port`
    /// - Provider base URL, model, and key variable are non-empty
    /// - Temperature is within [0, 2]
    /// - All timeouts are non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid bind address '{}': expected host:port",
                    self.server.bind_addr
                ),
            });
        }

        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Provider base_url must not be empty".to_string(),
            });
        }

        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Provider model must not be empty".to_string(),
            });
        }

        if self.provider.api_key_env.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "Provider api_key_env must not be empty".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Temperature {} is outside the valid range [0, 2]",
                    self.provider.temperature
                ),
            });
        }

        let timeouts = [
            ("connect_timeout_seconds", self.provider.connect_timeout_seconds),
            ("request_timeout_seconds", self.provider.request_timeout_seconds),
            ("idle_timeout_seconds", self.provider.idle_timeout_seconds),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::ValidationError {
                    message: format!("{name} must be greater than zero"),
                });
            }
        }

        Ok(())
    }
}
