#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Launch configuration for the ElectrumX server launcher.
//!
//! Layout: `model.rs` (typed launch configuration), `defaults.rs` (compiled-in
//! values), `loader.rs` (defaults, YAML file and environment layering),
//! `coins.rs` (known coin/network pairs), `validate.rs` (advisory checks).

pub mod coins;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use coins::{CoinProfile, lookup_coin};
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, EnvSource, ProcessEnv};
pub use model::{EnvKey, LaunchConfig, LauncherSettings, ServerEnv};
pub use validate::{CheckReport, Finding, Severity, check_config, redact_daemon_url, sanitize_daemon_url};
