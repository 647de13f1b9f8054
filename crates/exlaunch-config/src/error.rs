//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("failed to read configuration file")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path of the configuration file.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The configuration file was not valid YAML for the expected layout.
    #[error("failed to parse configuration file")]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Source YAML error.
        source: serde_yaml::Error,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: String,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Coin and network did not match a known profile.
    #[error("unknown coin and network combination")]
    UnknownCoin {
        /// Coin name provided by the caller.
        coin: String,
        /// Network name provided by the caller.
        net: String,
    },
    /// Daemon URL did not match the expected `user:pass@host[:port]` layout.
    #[error("invalid daemon url")]
    InvalidDaemonUrl {
        /// Daemon URL with credentials redacted.
        url: String,
    },
    /// A built-in pattern failed to compile.
    #[error("failed to compile pattern")]
    Pattern {
        /// Source regex error.
        source: regex::Error,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
