//! Error types for configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
///
/// Any of these aborts startup before the first cycle.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// No API key in the config file or the OPENAI_API_KEY environment
    /// variable.
    #[error("OPENAI_API_KEY is not configured; set it in the environment or in the config file")]
    MissingApiKey,

    /// OCR confidence threshold outside [0, 100].
    #[error("OCR confidence threshold {value} is out of range (expected 0-100)")]
    InvalidThreshold { value: u16 },

    /// Failed to create a working directory (screenshots, store parent).
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Type alias for Result with ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;
