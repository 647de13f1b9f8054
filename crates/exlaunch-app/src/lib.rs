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
#![allow(clippy::redundant_pub_crate)]

//! Launcher for an ElectrumX server: resolves configuration, raises the open
//! file limit and starts the server detached with its output appended to a
//! log file.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `bootstrap.rs`: the launch sequence
//! - `output.rs`: renderers for command output
//! - `error.rs`: launcher errors and exit codes
//! - `main.rs`: thin entrypoint delegating to `run()`

pub mod bootstrap;
pub(crate) mod cli;
pub mod error;
pub(crate) mod output;

pub use bootstrap::{launch, launch_with};
pub use cli::{execute, run};
pub use error::{AppError, AppResult, error_chain};
