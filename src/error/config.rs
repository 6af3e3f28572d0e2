//! Errors raised while loading and validating the server configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file named on the command line does not exist.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// A configuration source could not be parsed or deserialized.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A value failed validation.
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// A numeric value lies outside what the server accepts.
    #[error("Configuration value {key} is out of valid range: {message}")]
    ValueOutOfRange {
        /// Dotted key of the offending value
        key: String,
        /// Description of the valid range
        message: String,
    },
}
