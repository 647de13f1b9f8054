//! Polling helpers for output written by detached processes.

use std::fs;
use std::path::Path;
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Poll `path` until its contents satisfy `done`, returning the contents.
///
/// # Errors
///
/// Returns an error if `timeout` elapses first.
pub fn wait_for_contents<F>(path: &Path, timeout: Duration, done: F) -> Result<String>
where
    F: Fn(&str) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let contents = fs::read_to_string(path).unwrap_or_default();
        if done(&contents) {
            return Ok(contents);
        }
        if Instant::now() >= deadline {
            bail!(
                "timed out after {timeout:?} waiting on {}; last contents: {contents:?}",
                path.display()
            );
        }
        sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_once_predicate_holds() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("log");
        fs::write(&path, "ready\n")?;
        let contents = wait_for_contents(&path, Duration::from_secs(1), |text| {
            text.contains("ready")
        })?;
        assert_eq!(contents, "ready\n");
        Ok(())
    }

    #[test]
    fn times_out_on_missing_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let result = wait_for_contents(
            &dir.path().join("never"),
            Duration::from_millis(50),
            |text| !text.is_empty(),
        );
        assert!(result.is_err());
        Ok(())
    }
}
