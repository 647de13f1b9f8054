//! Process-wide span carrying the command and build identifier.

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the launcher span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    #[must_use]
    /// Enter the launcher span, tagged with the command being run.
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "launcher",
            command = %command,
            build_sha = %build_sha()
        )));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_context_guard_enters_and_drops() {
        let guard = GlobalContextGuard::new("start");
        tracing::info!("inside launcher span");
        drop(guard);
    }
}
