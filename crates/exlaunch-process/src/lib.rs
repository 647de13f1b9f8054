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

//! Process plumbing for the launcher: open-file limits and detached spawning.
//!
//! Layout: `limits.rs` (descriptor limit adjustment), `spawn.rs` (detached,
//! append-logged child processes), `error.rs` (error types).

pub mod error;
pub mod limits;
pub mod spawn;

pub use error::{ResourceLimitError, SpawnError, SpawnResult};
pub use limits::{LimitAdjuster, NofileLimits, SystemLimits, plan_nofile};
pub use spawn::{LaunchedServer, spawn_detached};
