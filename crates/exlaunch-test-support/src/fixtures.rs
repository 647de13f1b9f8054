//! Stub server executables and environment helpers.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// A shell script standing in for the server binary, with a sibling log path.
///
/// The temporary directory (and everything the stub wrote) is removed when
/// the fixture is dropped.
#[derive(Debug)]
pub struct StubServer {
    dir: TempDir,
    executable: PathBuf,
    log_file: PathBuf,
}

impl StubServer {
    /// Write an executable `/bin/sh` script running `body`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory or script cannot be created.
    pub fn new(body: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create stub directory")?;
        let executable = dir.path().join("electrumx_stub");
        fs::write(&executable, format!("#!/bin/sh\n{body}\n"))
            .with_context(|| format!("failed to write {}", executable.display()))?;
        make_executable(&executable)?;
        let log_file = dir.path().join("logs").join("electrumx.log");
        Ok(Self {
            dir,
            executable,
            log_file,
        })
    }

    /// Stub that prints its environment and exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be written.
    pub fn env_dumper() -> Result<Self> {
        Self::new("env\necho stub-finished")
    }

    /// Stub that prints `line` to stdout and `line` prefixed with `err:` to stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be written.
    pub fn echo(line: &str) -> Result<Self> {
        Self::new(&format!("echo '{line}'\necho 'err:{line}' 1>&2"))
    }

    /// Stub that sleeps for `seconds` before exiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the script cannot be written.
    pub fn sleeper(seconds: u32) -> Result<Self> {
        Self::new(&format!("exec sleep {seconds}"))
    }

    /// Path of the stub script.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Log file path inside the fixture directory (its parent does not exist yet).
    #[must_use]
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Fixture directory root.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path inside the fixture directory that is guaranteed not to exist.
    #[must_use]
    pub fn missing_path(&self) -> PathBuf {
        self.dir.path().join("does-not-exist")
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Build an environment map from `(name, value)` pairs.
#[must_use]
pub fn env_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect()
}
