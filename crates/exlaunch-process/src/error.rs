//! # Design
//!
//! - Keep limit failures and spawn failures apart: the launcher tolerates the
//!   former and surfaces the latter.
//! - Constant messages; paths and limits travel as context fields.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for spawn operations.
pub type SpawnResult<T> = Result<T, SpawnError>;

/// Adjusting the open file descriptor limit failed.
#[derive(Debug, Error)]
pub enum ResourceLimitError {
    /// Reading the current limit failed.
    #[error("failed to query open file limit")]
    Query {
        /// Underlying OS error.
        source: io::Error,
    },
    /// Applying the new limit failed, usually for lack of privilege.
    #[error("failed to set open file limit")]
    Set {
        /// Requested soft limit.
        soft: u64,
        /// Requested hard limit.
        hard: u64,
        /// Underlying OS error.
        source: io::Error,
    },
    /// The platform has no adjustable descriptor limit.
    #[error("open file limit is not adjustable on this platform")]
    Unsupported,
}

/// Starting the server process failed.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// Creating the log file's parent directory failed.
    #[error("failed to create log directory")]
    CreateLogDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Opening the log file for appending failed.
    #[error("failed to open log file")]
    OpenLog {
        /// Log file path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Duplicating the log handle for stderr failed.
    #[error("failed to duplicate log file handle")]
    CloneLog {
        /// Log file path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The server executable does not exist.
    #[error("server executable not found")]
    NotFound {
        /// Executable path.
        executable: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The server executable could not be executed.
    #[error("server executable not permitted")]
    PermissionDenied {
        /// Executable path.
        executable: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Any other failure reported while starting the process.
    #[error("failed to start server process")]
    Spawn {
        /// Executable path.
        executable: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl SpawnError {
    pub(crate) fn from_spawn(executable: PathBuf, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { executable, source },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { executable, source },
            _ => Self::Spawn { executable, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn spawn_errors_are_classified_by_kind() {
        let exe = PathBuf::from("/usr/local/bin/electrumxqtum_server");
        assert!(matches!(
            SpawnError::from_spawn(exe.clone(), io::Error::from(io::ErrorKind::NotFound)),
            SpawnError::NotFound { .. }
        ));
        assert!(matches!(
            SpawnError::from_spawn(
                exe.clone(),
                io::Error::from(io::ErrorKind::PermissionDenied)
            ),
            SpawnError::PermissionDenied { .. }
        ));
        let other = SpawnError::from_spawn(exe, io::Error::other("exec format error"));
        assert!(matches!(other, SpawnError::Spawn { .. }));
        assert_eq!(other.to_string(), "failed to start server process");
        assert!(other.source().is_some());
    }

    #[test]
    fn limit_errors_keep_constant_messages() {
        let err = ResourceLimitError::Set {
            soft: 10_000,
            hard: 10_000,
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.to_string(), "failed to set open file limit");
        assert!(ResourceLimitError::Unsupported.source().is_none());
    }
}
