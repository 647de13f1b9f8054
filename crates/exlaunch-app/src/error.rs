//! # Design
//!
//! - Centralize launcher-level errors for configuration, logging and spawn.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Map every failure to a process exit code in one place.

use std::error::Error;
use std::io;
use std::path::PathBuf;

use exlaunch_process::SpawnError;
use thiserror::Error;

/// Result alias for launcher operations.
pub type AppResult<T> = Result<T, AppError>;

/// Launcher-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Command-line arguments were rejected.
    #[error("invalid command line")]
    Usage {
        /// Source argument parser error.
        source: clap::Error,
    },
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: exlaunch_config::ConfigError,
    },
    /// Advisory checks reported errors.
    #[error("configuration check failed")]
    CheckFailed {
        /// Number of error findings.
        errors: usize,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: exlaunch_telemetry::TelemetryError,
    },
    /// Starting the server failed.
    #[error("server launch failed")]
    Spawn {
        /// Operation identifier.
        operation: &'static str,
        /// Source spawn error.
        source: SpawnError,
    },
    /// IO operations failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Optional path involved in the failure.
        path: Option<PathBuf>,
        /// Source IO error.
        source: io::Error,
    },
    /// Rendering JSON output failed.
    #[error("failed to render output")]
    Output {
        /// Source serde error.
        source: serde_json::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: exlaunch_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: exlaunch_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn spawn(operation: &'static str, source: SpawnError) -> Self {
        Self::Spawn { operation, source }
    }

    pub(crate) const fn write(source: io::Error) -> Self {
        Self::Io {
            operation: "output.write",
            path: None,
            source,
        }
    }

    /// Process exit code for this failure.
    ///
    /// Mirrors shell conventions: 127 for a missing executable, 126 for one
    /// that cannot be executed, 2 for configuration and usage problems.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. } | Self::Config { .. } | Self::CheckFailed { .. } => 2,
            Self::Spawn {
                source: SpawnError::NotFound { .. },
                ..
            } => 127,
            Self::Spawn {
                source: SpawnError::PermissionDenied { .. },
                ..
            } => 126,
            Self::Spawn { .. } | Self::Telemetry { .. } | Self::Io { .. } | Self::Output { .. } => {
                1
            }
        }
    }

    /// Message followed by every source in the chain, separated by `: `.
    #[must_use]
    pub fn display_message(&self) -> String {
        error_chain(self)
    }
}

/// Render `err` and its sources as one line.
#[must_use]
pub fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
