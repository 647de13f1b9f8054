//! Layered configuration loader.
//!
//! # Design
//! - Resolve values from compiled defaults, then an optional YAML file, then
//!   environment variables; later layers win.
//! - Read variables through [`EnvSource`] so callers and tests never mutate
//!   the process environment.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::defaults::{CONFIG_PATH_ENV, EXECUTABLE_ENV, LOG_FILE_ENV, NOFILE_LIMIT_ENV};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{EnvKey, LaunchConfig};

/// Read-only view of environment variables.
pub trait EnvSource {
    /// Value of `name`, or `None` when unset or not valid unicode.
    fn var(&self, name: &str) -> Option<String>;
}

/// [`EnvSource`] backed by the current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileLayout {
    #[serde(default)]
    server: BTreeMap<String, Value>,
    #[serde(default)]
    launcher: LauncherSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LauncherSection {
    executable: Option<PathBuf>,
    log_file: Option<PathBuf>,
    nofile_limit: Option<u64>,
}

/// Builds a [`LaunchConfig`] from defaults, an optional file and the environment.
#[derive(Debug)]
pub struct ConfigLoader<'a, E: EnvSource> {
    env: &'a E,
    file: Option<PathBuf>,
}

impl<'a, E: EnvSource> ConfigLoader<'a, E> {
    /// Create a loader reading variables from `env`.
    #[must_use]
    pub const fn new(env: &'a E) -> Self {
        Self { env, file: None }
    }

    /// Use `path` as the configuration file instead of `EXLAUNCH_CONFIG`.
    #[must_use]
    pub fn with_file(mut self, path: Option<PathBuf>) -> Self {
        self.file = path;
        self
    }

    /// Configuration file that will be read, if any.
    #[must_use]
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.clone().or_else(|| {
            self.env
                .var(CONFIG_PATH_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
    }

    /// Resolve the launch configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed,
    /// or if a launcher setting is invalid.
    pub fn load(&self) -> ConfigResult<LaunchConfig> {
        let mut config = LaunchConfig::default();
        if let Some(path) = self.file_path() {
            apply_file(&mut config, &path)?;
        }
        apply_env(&mut config, self.env)?;
        Ok(config)
    }
}

fn apply_file(config: &mut LaunchConfig, path: &Path) -> ConfigResult<()> {
    debug!(path = %path.display(), "reading launch configuration file");
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config_file.read",
        path: path.to_path_buf(),
        source,
    })?;
    let layout = if contents.trim().is_empty() {
        FileLayout::default()
    } else {
        serde_yaml::from_str::<FileLayout>(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };

    for (name, value) in layout.server {
        let value = scalar_to_string(&name, &value)?;
        match EnvKey::from_name(&name) {
            Some(key) => config.server.set(key, value),
            None => {
                validate_variable_name(&name)?;
                config.extra.insert(name, value);
            }
        }
    }

    let launcher = layout.launcher;
    if let Some(executable) = launcher.executable {
        config.launcher.executable = non_empty_path("executable", executable)?;
    }
    if let Some(log_file) = launcher.log_file {
        config.launcher.log_file = non_empty_path("log_file", log_file)?;
    }
    if let Some(limit) = launcher.nofile_limit {
        config.launcher.nofile_limit = positive_limit(limit, &limit.to_string())?;
    }
    Ok(())
}

fn apply_env<E: EnvSource>(config: &mut LaunchConfig, env: &E) -> ConfigResult<()> {
    for key in EnvKey::ALL {
        if let Some(value) = env.var(key.as_str()) {
            config.server.set(key, value);
        }
    }
    if let Some(value) = env.var(EXECUTABLE_ENV) {
        config.launcher.executable = non_empty_path("executable", PathBuf::from(value))?;
    }
    if let Some(value) = env.var(LOG_FILE_ENV) {
        config.launcher.log_file = non_empty_path("log_file", PathBuf::from(value))?;
    }
    if let Some(value) = env.var(NOFILE_LIMIT_ENV) {
        let parsed = value
            .trim()
            .parse::<u64>()
            .map_err(|_| invalid_limit(&value))?;
        config.launcher.nofile_limit = positive_limit(parsed, &value)?;
    }
    Ok(())
}

fn scalar_to_string(name: &str, value: &Value) -> ConfigResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => Ok(text.clone()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => {
            Err(ConfigError::InvalidField {
                section: "server",
                field: name.to_string(),
                value: None,
                reason: "not_a_scalar",
            })
        }
    }
}

fn validate_variable_name(name: &str) -> ConfigResult<()> {
    if name.is_empty() || name.contains(['=', '\0']) {
        return Err(ConfigError::InvalidField {
            section: "server",
            field: name.to_string(),
            value: None,
            reason: "invalid_variable_name",
        });
    }
    Ok(())
}

fn non_empty_path(field: &str, path: PathBuf) -> ConfigResult<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::InvalidField {
            section: "launcher",
            field: field.to_string(),
            value: None,
            reason: "empty",
        });
    }
    Ok(path)
}

fn positive_limit(limit: u64, raw: &str) -> ConfigResult<u64> {
    if limit == 0 {
        return Err(invalid_limit(raw));
    }
    Ok(limit)
}

fn invalid_limit(raw: &str) -> ConfigError {
    ConfigError::InvalidField {
        section: "launcher",
        field: "nofile_limit".to_string(),
        value: Some(raw.to_string()),
        reason: "not_a_positive_integer",
    }
}
