//! Launch sequence: raise the descriptor limit, then spawn detached.

use exlaunch_config::{EnvKey, LaunchConfig, redact_daemon_url};
use exlaunch_process::{LaunchedServer, LimitAdjuster, SystemLimits, spawn_detached};
use tracing::{info, warn};

use crate::error::{AppError, AppResult, error_chain};

/// Launch the configured server using the process's real resource limits.
///
/// # Errors
///
/// Returns an error if the server process could not be started.
pub fn launch(config: &LaunchConfig) -> AppResult<LaunchedServer> {
    launch_with(config, &SystemLimits)
}

/// Launch sequence with an injected limit adjuster.
///
/// A failed limit adjustment is logged and the spawn still goes ahead; only
/// a failed spawn is returned as an error. The server is never waited on.
///
/// # Errors
///
/// Returns an error if the server process could not be started.
pub fn launch_with<L: LimitAdjuster>(
    config: &LaunchConfig,
    limits: &L,
) -> AppResult<LaunchedServer> {
    info!(
        coin = config.server.get(EnvKey::Coin),
        net = config.server.get(EnvKey::Net),
        daemon_url = %redact_daemon_url(config.server.get(EnvKey::DaemonUrl)),
        "launching electrumx server"
    );

    let target = config.launcher.nofile_limit;
    match limits.raise_nofile(target) {
        Ok((before, after)) => info!(
            previous_soft = before.soft,
            soft = after.soft,
            hard = after.hard,
            "open file limit applied"
        ),
        Err(err) => warn!(
            target,
            error = %error_chain(&err),
            "could not raise open file limit; continuing"
        ),
    }

    spawn_detached(config).map_err(|err| AppError::spawn("spawn_detached", err))
}
