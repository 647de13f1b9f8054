//! Advisory checks for a resolved launch configuration.
//!
//! The launch path only uses the redaction helper here; the checks run
//! through `electrumx-launch check` or `start --check`.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::coins::lookup_coin;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{EnvKey, LaunchConfig};

static RPC_URL: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^.+@(\[[0-9a-fA-F:]+\]|[^:]+)(:[0-9]+)?"));

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The server will refuse to start or misbehave.
    Error,
    /// Worth a look, but the server can cope.
    Warning,
}

impl Severity {
    /// Lowercase label used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A single observation about the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Severity of the finding.
    pub severity: Severity,
    /// Configuration key or launcher field the finding is about.
    pub field: String,
    /// Human-readable description.
    pub message: String,
}

/// Findings produced by [`check_config`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Findings in the order they were produced.
    pub findings: Vec<Finding>,
}

impl CheckReport {
    /// Whether any finding is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|finding| finding.severity == Severity::Error)
    }

    /// Number of error findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Error)
            .count()
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, field, message);
    }

    fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, field, message);
    }

    fn push(&mut self, severity: Severity, field: impl Into<String>, message: impl Into<String>) {
        self.findings.push(Finding {
            severity,
            field: field.into(),
            message: message.into(),
        });
    }
}

/// Normalise one daemon URL.
///
/// Surrounding whitespace and trailing slashes are removed, `default_port` is
/// appended when the URL has none, `http://` is prefixed unless an `http` or
/// `https` scheme is present, and the result ends with `/`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDaemonUrl`] when the URL lacks the
/// `user:pass@host` layout.
pub fn sanitize_daemon_url(url: &str, default_port: Option<u16>) -> ConfigResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let pattern = RPC_URL
        .as_ref()
        .map_err(|source| ConfigError::Pattern {
            source: source.clone(),
        })?;
    let captures = pattern
        .captures(trimmed)
        .ok_or_else(|| ConfigError::InvalidDaemonUrl {
            url: redact_daemon_url(trimmed),
        })?;

    let mut sanitized = trimmed.to_string();
    if captures.get(2).is_none()
        && let Some(port) = default_port
    {
        sanitized = format!("{sanitized}:{port}");
    }
    if !(sanitized.starts_with("http://") || sanitized.starts_with("https://")) {
        sanitized = format!("http://{sanitized}");
    }
    sanitized.push('/');
    Ok(sanitized)
}

/// Replace the password portion of every URL in a comma-separated list.
///
/// A comma only ends an entry once that entry contains `@`, so a password
/// holding a comma is masked whole rather than split across entries.
#[must_use]
pub fn redact_daemon_url(urls: &str) -> String {
    let mut entries = Vec::new();
    let mut pending: Option<String> = None;
    for piece in urls.split(',') {
        let entry = match pending.take() {
            Some(head) => format!("{head},{piece}"),
            None => piece.to_string(),
        };
        if entry.contains('@') {
            entries.push(redact_one(&entry));
        } else {
            pending = Some(entry);
        }
    }
    entries.extend(pending);
    entries.join(",")
}

fn redact_one(url: &str) -> String {
    let Some(at) = url.rfind('@') else {
        return url.to_string();
    };
    let body = url.trim_start();
    let scheme_len = ["http://", "https://"]
        .into_iter()
        .find(|scheme| body.starts_with(scheme))
        .map_or(0, str::len);
    let userinfo_start = url.len() - body.len() + scheme_len;
    if userinfo_start > at {
        return url.to_string();
    }
    match url[userinfo_start..at].find(':') {
        Some(colon) => {
            let password_start = userinfo_start + colon + 1;
            format!("{}***{}", &url[..password_start], &url[at..])
        }
        None => url.to_string(),
    }
}

/// Run every advisory check against `config`.
#[must_use]
pub fn check_config(config: &LaunchConfig) -> CheckReport {
    let mut report = CheckReport::default();
    let server = &config.server;

    let coin = server.get(EnvKey::Coin);
    let net = server.get(EnvKey::Net);
    let profile = match lookup_coin(coin, net) {
        Ok(profile) => Some(profile),
        Err(_) => {
            report.error(
                EnvKey::Coin.as_str(),
                format!("unknown coin '{coin}' on network '{net}'"),
            );
            None
        }
    };

    check_daemon_url(
        &mut report,
        server.get(EnvKey::DaemonUrl),
        profile.map(|p| p.rpc_port),
    );

    match server.get(EnvKey::CacheMb).trim().parse::<u64>() {
        Ok(megabytes) if megabytes > 0 => {}
        _ => report.error(EnvKey::CacheMb.as_str(), "must be a positive integer"),
    }

    let tcp_port = check_port(&mut report, EnvKey::TcpPort, server.get(EnvKey::TcpPort), true);
    let ssl_port = check_port(&mut report, EnvKey::SslPort, server.get(EnvKey::SslPort), true);
    check_port(&mut report, EnvKey::RpcPort, server.get(EnvKey::RpcPort), false);
    if let (Some(tcp), Some(ssl)) = (tcp_port, ssl_port)
        && tcp == ssl
    {
        report.error(
            EnvKey::SslPort.as_str(),
            format!("shares port {ssl} with TCP_PORT"),
        );
    }
    if let Some(profile) = profile {
        for (key, port, expected) in [
            (EnvKey::TcpPort, tcp_port, profile.tcp_port),
            (EnvKey::SslPort, ssl_port, profile.ssl_port),
        ] {
            if let Some(port) = port
                && port != expected
            {
                report.warning(
                    key.as_str(),
                    format!(
                        "port {port} differs from the {} {} default {expected} that peers expect",
                        profile.name, profile.net
                    ),
                );
            }
        }
    }

    if !server.get(EnvKey::SslPort).trim().is_empty() {
        for key in [EnvKey::SslCertfile, EnvKey::SslKeyfile] {
            let value = server.get(key);
            if value.is_empty() {
                report.error(key.as_str(), "required when SSL_PORT is set");
            } else if !Path::new(value).is_file() {
                report.error(key.as_str(), format!("file '{value}' does not exist"));
            }
        }
    }

    let banner = server.get(EnvKey::BannerFile);
    if !banner.is_empty() && !Path::new(banner).is_file() {
        report.warning(
            EnvKey::BannerFile.as_str(),
            format!("file '{banner}' does not exist"),
        );
    }

    let db_directory = server.get(EnvKey::DbDirectory);
    if db_directory.is_empty() {
        report.error(EnvKey::DbDirectory.as_str(), "must not be empty");
    } else if !Path::new(db_directory).is_dir() {
        report.warning(
            EnvKey::DbDirectory.as_str(),
            format!("directory '{db_directory}' does not exist yet"),
        );
    }

    check_executable(&mut report, &config.launcher.executable);

    if let Some(parent) = config
        .launcher
        .log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        && !parent.is_dir()
    {
        report.warning(
            "log_file",
            format!("directory '{}' will be created", parent.display()),
        );
    }

    report
}

fn check_daemon_url(report: &mut CheckReport, urls: &str, default_port: Option<u16>) {
    if urls.trim().is_empty() {
        report.error(EnvKey::DaemonUrl.as_str(), "must not be empty");
        return;
    }
    for (index, url) in urls.split(',').enumerate() {
        if sanitize_daemon_url(url, default_port).is_err() {
            report.error(
                EnvKey::DaemonUrl.as_str(),
                format!(
                    "entry {} is not of the form user:pass@host[:port]",
                    index + 1
                ),
            );
        }
    }
}

fn check_port(report: &mut CheckReport, key: EnvKey, value: &str, optional: bool) -> Option<u16> {
    let value = value.trim();
    if value.is_empty() {
        if !optional {
            report.error(key.as_str(), "must not be empty");
        }
        return None;
    }
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Some(port),
        _ => {
            report.error(
                key.as_str(),
                format!("'{value}' is not a port between 1 and 65535"),
            );
            None
        }
    }
}

fn check_executable(report: &mut CheckReport, path: &Path) {
    let Ok(metadata) = path.metadata() else {
        report.error(
            "executable",
            format!("'{}' does not exist", path.display()),
        );
        return;
    };
    if !metadata.is_file() {
        report.error(
            "executable",
            format!("'{}' is not a regular file", path.display()),
        );
        return;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            report.error(
                "executable",
                format!("'{}' is not executable", path.display()),
            );
        }
    }
}
