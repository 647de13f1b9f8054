//! Typed launch configuration models.
//!
//! # Design
//! - Pure data carriers built once by the loader and passed by reference to
//!   the spawn routine; nothing here touches the process environment.
//! - Server settings stay strings: the server parses them, the launcher only
//!   guarantees presence.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use crate::defaults;

/// Environment keys recognised by the server and always set for the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnvKey {
    /// Target chain identifier.
    Coin,
    /// Backing node RPC URL including credentials.
    DaemonUrl,
    /// Network selection.
    Net,
    /// In-memory cache budget in megabytes.
    CacheMb,
    /// On-disk index storage path.
    DbDirectory,
    /// TLS certificate path.
    SslCertfile,
    /// TLS key path.
    SslKeyfile,
    /// Banner file path.
    BannerFile,
    /// Donation address advertised to clients.
    DonationAddress,
    /// Bind address.
    Host,
    /// Client-facing TCP port.
    TcpPort,
    /// Client-facing TLS port.
    SslPort,
    /// Hostname advertised to peers and clients.
    ReportHost,
    /// Local administrative RPC port.
    RpcPort,
}

impl EnvKey {
    /// Every recognised key, in the order the child environment is rendered.
    pub const ALL: [Self; 14] = [
        Self::Coin,
        Self::DaemonUrl,
        Self::Net,
        Self::CacheMb,
        Self::DbDirectory,
        Self::SslCertfile,
        Self::SslKeyfile,
        Self::BannerFile,
        Self::DonationAddress,
        Self::Host,
        Self::TcpPort,
        Self::SslPort,
        Self::ReportHost,
        Self::RpcPort,
    ];

    /// Environment variable name for the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coin => "COIN",
            Self::DaemonUrl => "DAEMON_URL",
            Self::Net => "NET",
            Self::CacheMb => "CACHE_MB",
            Self::DbDirectory => "DB_DIRECTORY",
            Self::SslCertfile => "SSL_CERTFILE",
            Self::SslKeyfile => "SSL_KEYFILE",
            Self::BannerFile => "BANNER_FILE",
            Self::DonationAddress => "DONATION_ADDRESS",
            Self::Host => "HOST",
            Self::TcpPort => "TCP_PORT",
            Self::SslPort => "SSL_PORT",
            Self::ReportHost => "REPORT_HOST",
            Self::RpcPort => "RPC_PORT",
        }
    }

    /// Resolve a variable name to a recognised key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl Display for EnvKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Values for every recognised server key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEnv {
    values: BTreeMap<EnvKey, String>,
}

impl ServerEnv {
    /// Value currently assigned to `key`.
    #[must_use]
    pub fn get(&self, key: EnvKey) -> &str {
        self.values.get(&key).map_or("", String::as_str)
    }

    /// Replace the value assigned to `key`.
    pub fn set(&mut self, key: EnvKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Iterate `(key, value)` pairs in [`EnvKey::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (EnvKey, &str)> + '_ {
        EnvKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }
}

impl Default for ServerEnv {
    fn default() -> Self {
        let values = EnvKey::ALL
            .into_iter()
            .map(|key| {
                let value = match key {
                    EnvKey::Coin => defaults::COIN,
                    EnvKey::DaemonUrl => defaults::DAEMON_URL,
                    EnvKey::Net => defaults::NET,
                    EnvKey::CacheMb => defaults::CACHE_MB,
                    EnvKey::DbDirectory => defaults::DB_DIRECTORY,
                    EnvKey::SslCertfile => defaults::SSL_CERTFILE,
                    EnvKey::SslKeyfile => defaults::SSL_KEYFILE,
                    EnvKey::BannerFile => defaults::BANNER_FILE,
                    EnvKey::DonationAddress => defaults::DONATION_ADDRESS,
                    EnvKey::Host => defaults::HOST,
                    EnvKey::TcpPort => defaults::TCP_PORT,
                    EnvKey::SslPort => defaults::SSL_PORT,
                    EnvKey::ReportHost => defaults::REPORT_HOST,
                    EnvKey::RpcPort => defaults::RPC_PORT,
                };
                (key, value.to_string())
            })
            .collect();
        Self { values }
    }
}

/// Settings that govern the launcher itself rather than the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    /// Server binary to start.
    pub executable: PathBuf,
    /// File receiving the server's stdout and stderr in append mode.
    pub log_file: PathBuf,
    /// Open file descriptor limit applied before spawning.
    pub nofile_limit: u64,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(defaults::EXECUTABLE),
            log_file: PathBuf::from(defaults::LOG_FILE),
            nofile_limit: defaults::NOFILE_LIMIT,
        }
    }
}

/// Fully resolved launch configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Recognised server keys.
    pub server: ServerEnv,
    /// Additional pass-through server variables from the config file.
    pub extra: BTreeMap<String, String>,
    /// Launcher-only settings.
    pub launcher: LauncherSettings,
}

impl LaunchConfig {
    /// Variables overlaid on the inherited environment of the child.
    ///
    /// Recognised keys come first in [`EnvKey::ALL`] order, followed by extra
    /// keys sorted by name. Extra keys never shadow a recognised key.
    #[must_use]
    pub fn child_env(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .server
            .iter()
            .map(|(key, value)| (key.as_str(), value))
            .collect();
        pairs.extend(
            self.extra
                .iter()
                .filter(|(name, _)| EnvKey::from_name(name).is_none())
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );
        pairs
    }
}
