// src/exec/child.rs

//! Spawning a single wrapper and waiting for it to become ready.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, warn};

use crate::engine::WrapperOutcome;
use crate::errors::{BootstrapError, Result};
use crate::types::CanonicalIdentity;

use super::readiness::{await_readiness, next_stdout_line, ReadinessPolicy, StdoutLines};

/// Launch `wrapper` and wait until it is ready, has exited, or the policy's
/// deadline passes.
///
/// - The child gets a copy of our environment, our stderr, and a pipe for
///   stdout. It takes no arguments and reads from `/dev/null`.
/// - A spawn failure is an outcome ([`WrapperOutcome::SpawnFailed`]), not an
///   error.
/// - The child is never killed. If it is still running once the outcome is
///   known, its stdout keeps being drained in the background.
pub async fn launch_and_await_ready(
    wrapper: &CanonicalIdentity,
    policy: &ReadinessPolicy,
) -> Result<WrapperOutcome> {
    info!(wrapper = %wrapper, "starting exec wrapper");

    let mut cmd = Command::new(wrapper.as_path());
    // Environment is inherited, i.e. copied from ours when the child starts.
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(false);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(wrapper = %wrapper, error = %err, "exec wrapper failed to start; skipping");
            return Ok(WrapperOutcome::SpawnFailed {
                reason: err.to_string(),
            });
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| BootstrapError::PipeUnavailable(wrapper.as_path().to_path_buf()))?;

    info!(
        wrapper = %wrapper,
        pid = ?child.id(),
        "exec wrapper started in background"
    );

    let mut lines = BufReader::new(stdout).split(b'\n');
    let outcome = await_readiness(wrapper.as_path(), &mut lines, child.wait(), policy).await?;

    match &outcome {
        WrapperOutcome::Ready => {}
        WrapperOutcome::ExitedWithoutReady { code } => {
            info!(
                wrapper = %wrapper,
                ?code,
                "proceeding without explicit READY signal (wrapper exited early)"
            );
        }
        other => {
            info!(wrapper = %wrapper, outcome = ?other, "proceeding without explicit READY signal");
        }
    }

    hand_off(wrapper, child, lines);
    Ok(outcome)
}

/// Leave a still-running child to itself, draining its stdout so it never
/// blocks on a full pipe.
fn hand_off(wrapper: &CanonicalIdentity, mut child: Child, mut lines: StdoutLines<BufReader<ChildStdout>>) {
    match child.try_wait() {
        Ok(Some(status)) => {
            debug!(wrapper = %wrapper, code = ?status.code(), "wrapper already exited");
            return;
        }
        Ok(None) => {}
        Err(err) => {
            debug!(wrapper = %wrapper, error = %err, "could not query wrapper status");
        }
    }

    let wrapper = wrapper.clone();
    tokio::spawn(async move {
        while let Ok(Some(line)) = next_stdout_line(&mut lines).await {
            debug!(target: "icebreak::stdout", wrapper = %wrapper, "{}", line);
        }
        debug!(wrapper = %wrapper, "wrapper stdout closed");

        match child.wait().await {
            Ok(status) => debug!(wrapper = %wrapper, code = ?status.code(), "wrapper exited"),
            Err(err) => debug!(wrapper = %wrapper, error = %err, "failed waiting for wrapper"),
        }
    });
}
