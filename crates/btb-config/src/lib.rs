//! # btb Configuration
//!
//! YAML configuration for the btb command runner.
//!
//! Every section and field is optional; a missing file means defaults.
//!
//! ```yaml
//! log:
//!   file: ${BUILD_DIR:-.}/btb.log
//!   level: debug
//! run:
//!   tail_lines: 40
//!   retries: 1
//!   file_ops: shell
//! ```

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod parser;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "btb.yaml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Log file settings
    #[serde(default)]
    pub log: LogSettings,

    /// Command execution settings
    #[serde(default)]
    pub run: RunSettings,
}

/// Log file settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    /// Log file path; relative paths resolve against the working directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Most verbose level written to the log file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl LogSettings {
    /// Log file path, `btb.log` when unset
    pub fn file_or_default(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| PathBuf::from("btb.log"))
    }

    /// Parsed log level, debug when unset
    pub fn level_or_default(&self) -> Result<tracing::Level> {
        match &self.level {
            Some(level) => level.parse().map_err(|_| {
                ConfigError::ValidationError(format!("Unknown log level: {level}"))
            }),
            None => Ok(tracing::Level::DEBUG),
        }
    }
}

/// Command execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    /// Log lines echoed back after a failed command
    #[serde(default = "default_tail_lines")]
    pub tail_lines: usize,

    /// Extra attempts for retried commands
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Backend for copy and chmod
    #[serde(default)]
    pub file_ops: FileOpsKind,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            tail_lines: default_tail_lines(),
            retries: default_retries(),
            file_ops: FileOpsKind::default(),
        }
    }
}

fn default_tail_lines() -> usize {
    40
}

fn default_retries() -> u32 {
    1
}

/// Which backend the file helpers use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOpsKind {
    /// Shell out to `cp` and `chmod`
    #[default]
    Shell,
    /// Use the native file APIs
    Native,
}

impl Config {
    /// Load `path`, or return defaults when it does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        parser::parse_file(path)
    }
}
