// src/engine/mod.rs

//! Bootstrap sequencing.
//!
//! Guard, then resolver, then supervisor, strictly in that order and one
//! wrapper at a time. The IO-free outcome types live here; the sequencer
//! itself is [`runtime::Bootstrapper`].

use std::path::PathBuf;

use crate::types::CanonicalIdentity;

pub mod runtime;

pub use runtime::Bootstrapper;

/// Terminal state of one wrapper. None of these abort the sequence; fatal
/// conditions are reported as errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrapperOutcome {
    /// The process could not be started.
    SpawnFailed { reason: String },
    /// A readiness line was observed.
    Ready,
    /// The process exited before printing a readiness line.
    ExitedWithoutReady { code: Option<i32> },
    /// Stdout reached end-of-stream before a readiness line, with the process
    /// possibly still running.
    StreamClosed,
    /// The readiness deadline passed first.
    TimedOut,
}

impl WrapperOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WrapperOutcome::Ready)
    }
}

/// What happened to one resolved wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperReport {
    pub wrapper: CanonicalIdentity,
    pub outcome: WrapperOutcome,
}

/// Why a bootstrap call did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The bootstrap state says this environment already bootstrapped.
    AlreadyBootstrapped,
    /// `AWS_LAMBDA_EXEC_WRAPPER` is unset or blank.
    NoWrappersConfigured,
    /// Our own executable path is unknown, so self-invocation cannot be ruled
    /// out.
    SelfPathUnknown,
}

/// Result of one bootstrap call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapReport {
    Skipped(SkipReason),
    Completed(Vec<WrapperReport>),
}

impl BootstrapReport {
    /// Wrappers a launch was attempted for, in order.
    pub fn launched(&self) -> Vec<PathBuf> {
        match self {
            BootstrapReport::Skipped(_) => Vec::new(),
            BootstrapReport::Completed(reports) => reports
                .iter()
                .map(|r| r.wrapper.as_path().to_path_buf())
                .collect(),
        }
    }
}
