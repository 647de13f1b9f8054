//! Detached, append-logged server processes.
//!
//! # Design
//! - The child inherits the launcher's environment with the launch
//!   configuration overlaid on the `Command`; the launcher's own environment
//!   is never modified.
//! - stdout and stderr share one log file opened in append mode, so output
//!   from an instance that is still running is never overwritten.
//! - The child gets its own process group and a null stdin, so terminal
//!   job-control signals and the shell's hang-up broadcast do not reach it.
//!   It stays in the launcher's session and keeps its controlling terminal;
//!   starting a new session would need `setsid` in a `pre_exec` hook.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use exlaunch_config::LaunchConfig;
use tracing::{debug, info};

use crate::error::{SpawnError, SpawnResult};

/// Handle to a server process started by [`spawn_detached`].
///
/// Dropping the handle does not stop or wait for the process.
#[derive(Debug)]
pub struct LaunchedServer {
    child: Child,
    executable: PathBuf,
    log_file: PathBuf,
}

impl LaunchedServer {
    /// OS process identifier of the server.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Executable that was started.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Log file receiving the server's output.
    #[must_use]
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Take ownership of the underlying child, for callers that do want to
    /// signal or reap it.
    #[must_use]
    pub fn into_child(self) -> Child {
        self.child
    }
}

/// Start the configured server and return without waiting for it.
///
/// The call only blocks for the duration of `fork`/`exec`; it never waits on
/// the child's exit.
///
/// # Errors
///
/// Returns [`SpawnError`] when the log file cannot be prepared or the
/// executable cannot be started.
pub fn spawn_detached(config: &LaunchConfig) -> SpawnResult<LaunchedServer> {
    let settings = &config.launcher;
    let stdout = open_log(&settings.log_file)?;
    let stderr = stdout.try_clone().map_err(|source| SpawnError::CloneLog {
        path: settings.log_file.clone(),
        source,
    })?;

    let mut command = Command::new(&settings.executable);
    command
        .envs(config.child_env())
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr);
    detach(&mut command);

    debug!(
        executable = %settings.executable.display(),
        variables = config.child_env().len(),
        "spawning server process"
    );
    let child = command
        .spawn()
        .map_err(|source| SpawnError::from_spawn(settings.executable.clone(), source))?;
    info!(
        pid = child.id(),
        executable = %settings.executable.display(),
        log_file = %settings.log_file.display(),
        "server process started"
    );

    Ok(LaunchedServer {
        child,
        executable: settings.executable.clone(),
        log_file: settings.log_file.clone(),
    })
}

fn open_log(path: &Path) -> SpawnResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SpawnError::CreateLogDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SpawnError::OpenLog {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn detach(_command: &mut Command) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn open_log_creates_parents_and_appends() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("server.log");
        {
            let mut first = open_log(&path)?;
            first.write_all(b"first\n")?;
        }
        {
            let mut second = open_log(&path)?;
            second.write_all(b"second\n")?;
        }
        assert_eq!(fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }

    #[test]
    fn open_log_reports_directory_in_the_way() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let err = open_log(dir.path()).unwrap_err();
        assert!(matches!(err, SpawnError::OpenLog { .. }));
        Ok(())
    }
}
