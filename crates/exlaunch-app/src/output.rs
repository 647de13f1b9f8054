//! Output renderers for launcher commands.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use exlaunch_config::{CheckReport, EnvKey, LaunchConfig, Severity, redact_daemon_url};
use exlaunch_process::LaunchedServer;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::error::{AppError, AppResult};

pub(crate) fn render_env<W: Write>(
    config: &LaunchConfig,
    show_secrets: bool,
    format: OutputFormat,
    out: &mut W,
) -> AppResult<()> {
    let redacted = redact_daemon_url(config.server.get(EnvKey::DaemonUrl));
    let pairs: Vec<(&str, &str)> = config
        .child_env()
        .into_iter()
        .map(|(key, value)| {
            if !show_secrets && key == EnvKey::DaemonUrl.as_str() {
                (key, redacted.as_str())
            } else {
                (key, value)
            }
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let map: BTreeMap<&str, &str> = pairs.into_iter().collect();
            write_json(out, &map)
        }
        OutputFormat::Table => {
            for (key, value) in pairs {
                writeln!(out, "{key}={value}").map_err(AppError::write)?;
            }
            Ok(())
        }
    }
}

pub(crate) fn render_check<W: Write>(
    report: &CheckReport,
    format: OutputFormat,
    out: &mut W,
) -> AppResult<()> {
    match format {
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Table => {
            for finding in &report.findings {
                writeln!(
                    out,
                    "{:<8} {:<16} {}",
                    finding.severity.as_str(),
                    finding.field,
                    finding.message
                )
                .map_err(AppError::write)?;
            }
            let warnings = report
                .findings
                .iter()
                .filter(|finding| finding.severity == Severity::Warning)
                .count();
            writeln!(
                out,
                "{} error(s), {warnings} warning(s)",
                report.error_count()
            )
            .map_err(AppError::write)
        }
    }
}

pub(crate) fn render_launch<W: Write>(
    server: &LaunchedServer,
    format: OutputFormat,
    out: &mut W,
) -> AppResult<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &json!({
                "pid": server.pid(),
                "executable": server.executable().display().to_string(),
                "log_file": server.log_file().display().to_string(),
            }),
        ),
        OutputFormat::Table => {
            writeln!(out, "pid: {}", server.pid()).map_err(AppError::write)?;
            writeln!(out, "executable: {}", server.executable().display())
                .map_err(AppError::write)?;
            writeln!(out, "log file: {}", server.log_file().display()).map_err(AppError::write)
        }
    }
}

pub(crate) fn render_crontab<W: Write>(
    launcher: &Path,
    config_file: Option<&Path>,
    out: &mut W,
) -> AppResult<()> {
    writeln!(out, "{}", crontab_line(launcher, config_file)).map_err(AppError::write)
}

fn crontab_line(launcher: &Path, config_file: Option<&Path>) -> String {
    let mut line = format!("@reboot {}", cron_argument(launcher));
    if let Some(path) = config_file {
        line.push_str(" --config ");
        line.push_str(&cron_argument(path));
    }
    line.push_str(" start");
    line
}

/// Shell-quoted path with every `%` escaped for cron.
fn cron_argument(path: &Path) -> String {
    shell_quote(&path.display().to_string()).replace('%', r"\%")
}

fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '/' | '.' | '_' | '-' | ':' | '='));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

fn write_json<W: Write, T: serde::Serialize + ?Sized>(out: &mut W, value: &T) -> AppResult<()> {
    let text =
        serde_json::to_string_pretty(value).map_err(|source| AppError::Output { source })?;
    writeln!(out, "{text}").map_err(AppError::write)
}
