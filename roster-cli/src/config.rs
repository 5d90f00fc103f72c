//! Configuration management for the roster CLI.
//!
//! Configuration lives in `roster.toml` inside the data directory. Every field
//! is optional; a missing file means all defaults.

use roster_client::ClientConfig;
use std::path::{Path, PathBuf};

/// File name of the CLI configuration inside the data directory.
pub const CONFIG_FILE: &str = "roster.toml";

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Failed to write configuration file.
    #[error("failed to write config file {path}: {source}")]
    WriteError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to serialize configuration.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Path of the config file for `data_dir`.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Check if a config file exists.
pub fn exists(data_dir: &Path) -> bool {
    config_path(data_dir).exists()
}

/// Load the client configuration, falling back to defaults when no file exists.
pub async fn load(data_dir: &Path) -> Result<ClientConfig, ConfigError> {
    let path = config_path(data_dir);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ClientConfig::default()),
        Err(source) => return Err(ConfigError::ReadError { path, source }),
    };
    toml::from_str(&content).map_err(|source| ConfigError::ParseError { path, source })
}

/// Save the client configuration.
pub async fn save(data_dir: &Path, config: &ClientConfig) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(&path, content)
        .await
        .map_err(|source| ConfigError::WriteError { path, source })
}
