// src/exec/backend.rs

//! Pluggable launch backend.
//!
//! The bootstrapper talks to a `LaunchBackend` instead of spawning processes
//! itself, so tests can record which wrappers would have been launched
//! without running anything.

use std::future::Future;
use std::pin::Pin;

use crate::engine::WrapperOutcome;
use crate::errors::Result;
use crate::types::CanonicalIdentity;

use super::child::launch_and_await_ready;
use super::readiness::ReadinessPolicy;

/// Trait abstracting how a resolved wrapper is launched and awaited.
pub trait LaunchBackend: Send {
    /// Launch `wrapper` and resolve once its readiness is decided.
    ///
    /// Returning `Err` aborts the whole bootstrap sequence.
    fn launch<'a>(
        &'a mut self,
        wrapper: &'a CanonicalIdentity,
    ) -> Pin<Box<dyn Future<Output = Result<WrapperOutcome>> + Send + 'a>>;
}

/// Backend that spawns real OS processes.
#[derive(Debug, Clone, Default)]
pub struct RealLaunchBackend {
    policy: ReadinessPolicy,
}

impl RealLaunchBackend {
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self { policy }
    }
}

impl LaunchBackend for RealLaunchBackend {
    fn launch<'a>(
        &'a mut self,
        wrapper: &'a CanonicalIdentity,
    ) -> Pin<Box<dyn Future<Output = Result<WrapperOutcome>> + Send + 'a>> {
        Box::pin(launch_and_await_ready(wrapper, &self.policy))
    }
}
