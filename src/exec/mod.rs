// src/exec/mod.rs

//! Child supervision.
//!
//! - [`child`] spawns one wrapper and hands it off once readiness is known.
//! - [`readiness`] implements the stdout readiness protocol.
//! - [`backend`] provides the `LaunchBackend` trait and the production
//!   `RealLaunchBackend`; tests substitute a recording fake.

pub mod backend;
pub mod child;
pub mod readiness;

pub use backend::{LaunchBackend, RealLaunchBackend};
pub use child::launch_and_await_ready;
pub use readiness::{ReadinessPolicy, ReadyMatcher, DEFAULT_READY_TOKEN};
