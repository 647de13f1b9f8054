//! Open file descriptor limit adjustment.
//!
//! The limit is applied to the launcher itself and inherited by the server
//! across `exec`, which is how the shell's `ulimit -n` worked too.

use crate::error::ResourceLimitError;

/// Soft and hard `RLIMIT_NOFILE` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NofileLimits {
    /// Limit enforced by the kernel.
    pub soft: u64,
    /// Ceiling an unprivileged process may raise the soft limit to.
    pub hard: u64,
}

/// Seam over the OS limit calls so the launch sequence can be exercised with
/// failing adjusters.
pub trait LimitAdjuster {
    /// Set the soft descriptor limit to `target`, returning `(before, after)`.
    ///
    /// # Errors
    ///
    /// Returns an error when the limit cannot be read or applied.
    fn raise_nofile(
        &self,
        target: u64,
    ) -> Result<(NofileLimits, NofileLimits), ResourceLimitError>;
}

/// Limits to request when moving from `current` to a soft limit of `target`.
///
/// The hard limit is only touched when it is below `target`; raising it needs
/// privilege, so an adequate hard limit is always left alone.
#[must_use]
pub const fn plan_nofile(current: NofileLimits, target: u64) -> NofileLimits {
    let hard = if current.hard < target {
        target
    } else {
        current.hard
    };
    NofileLimits { soft: target, hard }
}

/// [`LimitAdjuster`] that calls `getrlimit`/`setrlimit` on the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLimits;

#[cfg(unix)]
impl LimitAdjuster for SystemLimits {
    fn raise_nofile(
        &self,
        target: u64,
    ) -> Result<(NofileLimits, NofileLimits), ResourceLimitError> {
        use nix::sys::resource::{Resource, getrlimit, setrlimit};

        let (soft, hard) = getrlimit(Resource::RLIMIT_NOFILE).map_err(|errno| {
            ResourceLimitError::Query {
                source: errno.into(),
            }
        })?;
        let before = NofileLimits { soft, hard };
        let after = plan_nofile(before, target);
        setrlimit(Resource::RLIMIT_NOFILE, after.soft, after.hard).map_err(|errno| {
            ResourceLimitError::Set {
                soft: after.soft,
                hard: after.hard,
                source: errno.into(),
            }
        })?;
        Ok((before, after))
    }
}

#[cfg(not(unix))]
impl LimitAdjuster for SystemLimits {
    fn raise_nofile(
        &self,
        _target: u64,
    ) -> Result<(NofileLimits, NofileLimits), ResourceLimitError> {
        Err(ResourceLimitError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_keeps_adequate_hard_limit() {
        let current = NofileLimits {
            soft: 1024,
            hard: 524_288,
        };
        assert_eq!(
            plan_nofile(current, 10_000),
            NofileLimits {
                soft: 10_000,
                hard: 524_288
            }
        );
    }

    #[test]
    fn plan_raises_low_hard_limit() {
        let current = NofileLimits {
            soft: 256,
            hard: 4096,
        };
        assert_eq!(
            plan_nofile(current, 10_000),
            NofileLimits {
                soft: 10_000,
                hard: 10_000
            }
        );
    }

    #[test]
    fn plan_lowers_soft_limit_to_target() {
        let current = NofileLimits {
            soft: 65_536,
            hard: u64::MAX,
        };
        let planned = plan_nofile(current, 10_000);
        assert_eq!(planned.soft, 10_000);
        assert_eq!(planned.hard, u64::MAX);
    }

    #[cfg(unix)]
    #[test]
    fn system_limits_apply_current_soft_limit() {
        use nix::sys::resource::{Resource, getrlimit};

        let Ok((soft, _)) = getrlimit(Resource::RLIMIT_NOFILE) else {
            return;
        };
        let (before, after) = SystemLimits
            .raise_nofile(soft)
            .expect("re-applying the current soft limit needs no privilege");
        assert_eq!(before.soft, soft);
        assert_eq!(after.soft, soft);
        assert_eq!(after.hard, before.hard);
    }
}
