// src/exec/readiness.rs

//! Readiness detection on a wrapper's stdout.
//!
//! A wrapper reports readiness by printing any line that contains the ready
//! token (`READY` by default). The supervisor waits on three signals at once
//! and takes whichever fires first:
//!
//! - the next stdout line,
//! - the child's exit notification,
//! - the optional readiness deadline.
//!
//! Nothing is polled: the exit notification comes from the runtime's child
//! reaper, not from probing the pid. The three branches are polled in random
//! order, so a wrapper that never stops writing cannot starve the deadline.
//!
//! Lines are raw bytes split on `\n` and decoded lossily. Output that is not
//! UTF-8 is still searched for the ready token; only real I/O errors are
//! fatal.

use std::future::Future;
use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncBufRead, Split};
use tokio::time::{sleep_until, timeout, Instant};
use tracing::{debug, info, warn};

use crate::engine::WrapperOutcome;
use crate::errors::{BootstrapError, Result};

/// Default readiness token.
pub const DEFAULT_READY_TOKEN: &str = "READY";

/// How long to keep reading already-written output after the child exits.
///
/// A wrapper that prints `READY` and exits immediately races its own exit
/// notification; the line is still sitting in the pipe.
pub const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(200);

/// What counts as a readiness line.
#[derive(Debug, Clone)]
pub enum ReadyMatcher {
    /// Line contains this substring.
    Token(String),
    /// Line matches this regex.
    Pattern(Regex),
}

impl ReadyMatcher {
    pub fn is_match(&self, line: &str) -> bool {
        match self {
            ReadyMatcher::Token(token) => line.contains(token.as_str()),
            ReadyMatcher::Pattern(re) => re.is_match(line),
        }
    }
}

impl Default for ReadyMatcher {
    fn default() -> Self {
        ReadyMatcher::Token(DEFAULT_READY_TOKEN.to_string())
    }
}

/// Matcher plus the optional upper bound on how long to wait.
#[derive(Debug, Clone, Default)]
pub struct ReadinessPolicy {
    pub matcher: ReadyMatcher,
    /// `None` waits until readiness, end of stream or exit.
    pub timeout: Option<Duration>,
}

/// Stdout of a wrapper, split into raw `\n`-terminated segments.
pub type StdoutLines<R> = Split<R>;

/// Read the next stdout line, dropping the line terminator and replacing
/// invalid UTF-8.
///
/// Cancel safe: a partially read line stays buffered in `lines`.
pub async fn next_stdout_line<R>(lines: &mut StdoutLines<R>) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let Some(mut segment) = lines.next_segment().await? else {
        return Ok(None);
    };
    if segment.last() == Some(&b'\r') {
        segment.pop();
    }
    Ok(Some(String::from_utf8_lossy(&segment).into_owned()))
}

/// Watch `lines` until the wrapper signals readiness or can no longer do so.
///
/// `exit` resolves when the child process terminates. Every stdout line is
/// forwarded to the log under the `icebreak::stdout` target.
///
/// A read error other than clean end-of-stream is returned as
/// [`BootstrapError::ReadFailed`]; everything else is an outcome.
pub async fn await_readiness<R, W>(
    wrapper: &Path,
    lines: &mut StdoutLines<R>,
    exit: W,
    policy: &ReadinessPolicy,
) -> Result<WrapperOutcome>
where
    R: AsyncBufRead + Unpin,
    W: Future<Output = io::Result<ExitStatus>>,
{
    tokio::pin!(exit);

    let deadline = policy.timeout.map(|t| Instant::now() + t);
    let expired = async move {
        match deadline {
            Some(at) => sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(expired);

    loop {
        tokio::select! {
            line = next_stdout_line(lines) => {
                match line {
                    Ok(Some(line)) => {
                        if observe_line(wrapper, &line, policy) {
                            return Ok(WrapperOutcome::Ready);
                        }
                    }
                    Ok(None) => {
                        debug!(wrapper = ?wrapper, "wrapper closed stdout before signaling readiness");
                        return Ok(WrapperOutcome::StreamClosed);
                    }
                    Err(source) => {
                        return Err(BootstrapError::ReadFailed {
                            path: wrapper.to_path_buf(),
                            source,
                        });
                    }
                }
            }

            status = &mut exit => {
                let code = match status {
                    Ok(status) => status.code(),
                    Err(err) => {
                        warn!(wrapper = ?wrapper, error = %err, "failed to observe wrapper exit status");
                        None
                    }
                };
                debug!(wrapper = ?wrapper, ?code, "wrapper exited; draining remaining stdout");

                if drain_after_exit(wrapper, lines, policy).await? {
                    return Ok(WrapperOutcome::Ready);
                }
                return Ok(WrapperOutcome::ExitedWithoutReady { code });
            }

            _ = &mut expired => {
                warn!(
                    wrapper = ?wrapper,
                    timeout = ?policy.timeout,
                    "wrapper did not signal readiness in time; continuing"
                );
                return Ok(WrapperOutcome::TimedOut);
            }
        }
    }
}

/// Log one stdout line and report whether it is a readiness line.
fn observe_line(wrapper: &Path, line: &str, policy: &ReadinessPolicy) -> bool {
    info!(target: "icebreak::stdout", wrapper = ?wrapper, "{}", line);

    if policy.matcher.is_match(line) {
        info!(wrapper = ?wrapper, "wrapper signaled readiness");
        return true;
    }
    false
}

/// Read whatever the exited child left in the pipe, bounded by
/// [`EXIT_DRAIN_GRACE`] in case a grandchild still holds the write end.
async fn drain_after_exit<R>(
    wrapper: &Path,
    lines: &mut StdoutLines<R>,
    policy: &ReadinessPolicy,
) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let drained = timeout(EXIT_DRAIN_GRACE, async {
        loop {
            match next_stdout_line(lines).await {
                Ok(Some(line)) => {
                    if observe_line(wrapper, &line, policy) {
                        return Ok(true);
                    }
                }
                Ok(None) => return Ok(false),
                Err(source) => {
                    return Err(BootstrapError::ReadFailed {
                        path: wrapper.to_path_buf(),
                        source,
                    });
                }
            }
        }
    })
    .await;

    match drained {
        Ok(result) => result,
        Err(_) => {
            debug!(wrapper = ?wrapper, "stdout still open after wrapper exit; giving up on drain");
            Ok(false)
        }
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
