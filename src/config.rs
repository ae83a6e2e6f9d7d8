//! Configuration management for lanshare
//!
//! Handles loading and saving configuration from ~/.config/lanshare/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::server::{default_upload_dir, DEFAULT_PORT};

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Application name for config directory
const APP_NAME: &str = "lanshare";

/// Keys accepted by `config set` / `config unset`
pub const CONFIG_KEYS: &[&str] = &["port", "upload_dir"];

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Unknown config key '{0}' (expected one of: {keys})", keys = CONFIG_KEYS.join(", "))]
    UnknownKey(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Port the server listens on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Directory where shared files are stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<PathBuf>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the config file path
    ///
    /// Returns ~/.config/lanshare/config.toml on Linux
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Get the config directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_NAME))
    }

    /// Load configuration from the default location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &std::path::Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    ///
    /// Creates the parent directory if it doesn't exist
    pub fn save_to(&self, path: &std::path::Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check if any configuration is set
    pub fn is_empty(&self) -> bool {
        self.port.is_none() && self.upload_dir.is_none()
    }

    /// Set a key from its string form, as given on the command line
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        match key {
            "port" => {
                let port: u16 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("'{}' is not a port number", value),
                })?;
                if port == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: "port must be non-zero".to_string(),
                    });
                }
                self.port = Some(port);
            }
            "upload_dir" => {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: "path must not be empty".to_string(),
                    });
                }
                self.upload_dir = Some(PathBuf::from(value));
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Clear a key
    pub fn unset_value(&mut self, key: &str) -> ConfigResult<()> {
        match key {
            "port" => self.port = None,
            "upload_dir" => self.upload_dir = None,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Get effective port
    ///
    /// CLI argument takes precedence, then config, then default
    pub fn effective_port(&self, cli_port: Option<u16>) -> u16 {
        cli_port.or(self.port).unwrap_or(DEFAULT_PORT)
    }

    /// Get effective upload directory
    ///
    /// CLI argument takes precedence, then config, then the `uploads`
    /// folder next to the executable
    pub fn effective_upload_dir(&self, cli_dir: Option<PathBuf>) -> PathBuf {
        cli_dir
            .or_else(|| self.upload_dir.clone())
            .unwrap_or_else(default_upload_dir)
    }
}

/// Format the configuration for display
pub fn format_config(config: &Config) -> String {
    let mut lines = Vec::new();

    lines.push("Current configuration:".to_string());
    lines.push(String::new());

    if let Some(port) = config.port {
        lines.push(format!("  port = {}", port));
    } else {
        lines.push(format!("  port = (not set, using {})", DEFAULT_PORT));
    }

    if let Some(ref dir) = config.upload_dir {
        lines.push(format!("  upload_dir = \"{}\"", dir.display()));
    } else {
        lines.push(format!(
            "  upload_dir = (not set, using {})",
            default_upload_dir().display()
        ));
    }

    lines.join("\n")
}
