// src/engine/runtime.rs

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::errors::Result;
use crate::exec::LaunchBackend;
use crate::fs::FileSystem;
use crate::guard::{should_bootstrap, BootstrapState};
use crate::resolve::resolve_wrappers;

use super::{BootstrapReport, SkipReason, WrapperReport};

/// Runs the guard → resolver → supervisor sequence once.
///
/// Each collaborator is injected: the bootstrap state decides idempotence,
/// the filesystem canonicalizes paths, and the launch backend starts wrappers
/// and waits for their readiness.
pub struct Bootstrapper<S: BootstrapState, F: FileSystem, L: LaunchBackend> {
    state: S,
    fs: F,
    launcher: L,
    wrappers: Option<String>,
    self_path: Option<PathBuf>,
}

impl<S, F, L> fmt::Debug for Bootstrapper<S, F, L>
where
    S: BootstrapState,
    F: FileSystem,
    L: LaunchBackend,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("fs", &self.fs)
            .field("wrappers", &self.wrappers)
            .field("self_path", &self.self_path)
            .finish_non_exhaustive()
    }
}

impl<S, F, L> Bootstrapper<S, F, L>
where
    S: BootstrapState,
    F: FileSystem,
    L: LaunchBackend,
{
    pub fn new(state: S, fs: F, launcher: L) -> Self {
        Self {
            state,
            fs,
            launcher,
            wrappers: None,
            self_path: None,
        }
    }

    /// Raw comma-separated wrapper list; `None` or blank disables bootstrap.
    pub fn with_wrappers(mut self, wrappers: Option<String>) -> Self {
        self.wrappers = wrappers;
        self
    }

    /// Path of the executable to treat as "self". Defaults to
    /// [`std::env::current_exe`].
    pub fn with_self_path(mut self, self_path: Option<PathBuf>) -> Self {
        self.self_path = self_path;
        self
    }

    /// Run the sequence.
    ///
    /// Wrappers are launched strictly in list order; the next one starts only
    /// after the previous one's readiness is decided. An `Err` means a fatal
    /// condition and the remaining wrappers were not launched.
    pub async fn run(&mut self) -> Result<BootstrapReport> {
        if !should_bootstrap(&self.state) {
            return Ok(BootstrapReport::Skipped(SkipReason::AlreadyBootstrapped));
        }

        let raw = match self.wrappers.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                debug!("AWS_LAMBDA_EXEC_WRAPPER not set; nothing to bootstrap");
                return Ok(BootstrapReport::Skipped(SkipReason::NoWrappersConfigured));
            }
        };

        let self_path = match self.self_path.clone() {
            Some(path) => path,
            None => match std::env::current_exe() {
                Ok(path) => path,
                Err(err) => {
                    error!(error = %err, "could not determine self path; skipping wrapper bootstrap");
                    return Ok(BootstrapReport::Skipped(SkipReason::SelfPathUnknown));
                }
            },
        };

        let wrappers = resolve_wrappers(&self.fs, raw, &self_path);
        info!(count = wrappers.len(), self_path = ?self_path, "exec wrappers to launch");

        let mut reports = Vec::with_capacity(wrappers.len());
        for wrapper in wrappers {
            let outcome = self.launcher.launch(&wrapper).await?;
            debug!(wrapper = %wrapper, ?outcome, "exec wrapper settled");
            reports.push(WrapperReport { wrapper, outcome });
        }

        let ready = reports.iter().filter(|r| r.outcome.is_ready()).count();
        info!(launched = reports.len(), ready, "wrapper bootstrap complete");
        Ok(BootstrapReport::Completed(reports))
    }
}
