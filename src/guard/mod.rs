// src/guard/mod.rs

//! Bootstrap guard.
//!
//! The wrapper sequence must run at most once per execution environment,
//! including across process restarts inside the same sandbox. The state that
//! remembers this lives outside the process; [`BootstrapState`] abstracts it
//! so tests can use [`InMemoryState`] instead of the real marker file.
//!
//! The check-then-mark in [`should_bootstrap`] is not atomic across
//! processes. Cold starts are single threaded, so two bootstrappers racing on
//! the same marker is an accepted limitation.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use tracing::{debug, warn};

pub mod marker;

pub use marker::{MarkerFileState, DEFAULT_MARKER_PATH, MARKER_CONTENTS, MARKER_MODE};

/// "Has the bootstrap already been attempted here?" plus a way to record it.
pub trait BootstrapState: Send + Sync {
    fn has_run(&self) -> bool;

    /// Record that bootstrap has been attempted. Repeated calls are harmless.
    fn mark_run(&self) -> Result<()>;
}

impl<S: BootstrapState + ?Sized> BootstrapState for &S {
    fn has_run(&self) -> bool {
        (**self).has_run()
    }

    fn mark_run(&self) -> Result<()> {
        (**self).mark_run()
    }
}

/// Process-local state; forgets everything on restart.
#[derive(Debug, Default)]
pub struct InMemoryState {
    ran: AtomicBool,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State that behaves as if a previous process already bootstrapped.
    pub fn already_run() -> Self {
        Self {
            ran: AtomicBool::new(true),
        }
    }
}

impl BootstrapState for InMemoryState {
    fn has_run(&self) -> bool {
        self.ran.load(Ordering::SeqCst)
    }

    fn mark_run(&self) -> Result<()> {
        self.ran.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Decide whether this process should run the bootstrap sequence.
///
/// Returns `false` when the state says it already ran. Otherwise marks the
/// state and returns `true`; a failure to mark is logged and ignored, which
/// only costs idempotence for this sandbox.
pub fn should_bootstrap<S: BootstrapState + ?Sized>(state: &S) -> bool {
    if state.has_run() {
        debug!("bootstrap marker present; skipping wrapper bootstrap");
        return false;
    }

    if let Err(err) = state.mark_run() {
        warn!(error = %err, "failed to record bootstrap marker; continuing");
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct BrokenState;

    impl BootstrapState for BrokenState {
        fn has_run(&self) -> bool {
            false
        }

        fn mark_run(&self) -> Result<()> {
            Err(anyhow!("read-only filesystem"))
        }
    }

    #[test]
    fn first_call_bootstraps_second_does_not() {
        let state = InMemoryState::new();
        assert!(should_bootstrap(&state));
        assert!(state.has_run());
        assert!(!should_bootstrap(&state));
    }

    #[test]
    fn previously_marked_state_skips() {
        let state = InMemoryState::already_run();
        assert!(!should_bootstrap(&state));
    }

    #[test]
    fn mark_failure_is_not_fatal() {
        assert!(should_bootstrap(&BrokenState));
        // Nothing was recorded, so the next call bootstraps again.
        assert!(should_bootstrap(&BrokenState));
    }
}
