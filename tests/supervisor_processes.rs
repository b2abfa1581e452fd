// tests/supervisor_processes.rs
//
// These spawn real `/bin/sh` scripts.
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::fs;
use std::time::Duration;

use icebreak::engine::{BootstrapReport, SkipReason, WrapperOutcome};
use icebreak::exec::{launch_and_await_ready, ReadinessPolicy};
use icebreak::fs::{FileSystem, RealFileSystem};
use icebreak::run_bootstrap;
use icebreak::types::CanonicalIdentity;
use icebreak_test_utils::builders::ConfigBuilder;
use icebreak_test_utils::scripts::{write_non_executable, write_script};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn identity(path: &std::path::Path) -> CanonicalIdentity {
    CanonicalIdentity::from_canonical(RealFileSystem.canonicalize(path).unwrap())
}

#[tokio::test]
async fn ready_wrapper_is_not_waited_on() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let script = write_script(dir.path(), "ext", "echo booting\necho 'ext READY'\nsleep 5");

    let outcome = with_timeout(launch_and_await_ready(
        &identity(&script),
        &ReadinessPolicy::default(),
    ))
    .await?;

    assert_eq!(outcome, WrapperOutcome::Ready);
    Ok(())
}

#[tokio::test]
async fn ready_printed_right_before_exit_is_seen() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let script = write_script(dir.path(), "ext", "echo READY\nexit 0");

    let outcome = with_timeout(launch_and_await_ready(
        &identity(&script),
        &ReadinessPolicy::default(),
    ))
    .await?;

    assert_eq!(outcome, WrapperOutcome::Ready);
    Ok(())
}

#[tokio::test]
async fn exit_without_ready_is_not_an_error() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    // The backgrounded sleep keeps stdout open, so only the exit can end the
    // wait.
    let script = write_script(dir.path(), "ext", "echo starting\nsleep 3 &\nexit 3");

    let outcome = with_timeout(launch_and_await_ready(
        &identity(&script),
        &ReadinessPolicy::default(),
    ))
    .await?;

    assert_eq!(outcome, WrapperOutcome::ExitedWithoutReady { code: Some(3) });
    Ok(())
}

#[tokio::test]
async fn closing_stdout_ends_the_wait() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let script = write_script(dir.path(), "ext", "echo starting\nexec >&-\nsleep 3");

    let outcome = with_timeout(launch_and_await_ready(
        &identity(&script),
        &ReadinessPolicy::default(),
    ))
    .await?;

    assert_eq!(outcome, WrapperOutcome::StreamClosed);
    Ok(())
}

#[tokio::test]
async fn silent_wrapper_times_out() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let script = write_script(dir.path(), "ext", "sleep 3");
    let policy = ReadinessPolicy {
        timeout: Some(Duration::from_millis(300)),
        ..ReadinessPolicy::default()
    };

    let outcome = with_timeout(launch_and_await_ready(&identity(&script), &policy)).await?;

    assert_eq!(outcome, WrapperOutcome::TimedOut);
    Ok(())
}

#[tokio::test]
async fn non_utf8_output_before_ready_is_tolerated() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let script = write_script(dir.path(), "ext", "printf 'caf\\351\\n'\necho READY\nsleep 2");

    let outcome = with_timeout(launch_and_await_ready(
        &identity(&script),
        &ReadinessPolicy::default(),
    ))
    .await?;

    assert_eq!(outcome, WrapperOutcome::Ready);
    Ok(())
}

#[tokio::test]
async fn endlessly_logging_wrapper_still_times_out() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let script = write_script(dir.path(), "ext", "exec yes hello");
    let policy = ReadinessPolicy {
        timeout: Some(Duration::from_millis(300)),
        ..ReadinessPolicy::default()
    };

    let outcome = with_timeout(launch_and_await_ready(&identity(&script), &policy)).await?;

    assert_eq!(outcome, WrapperOutcome::TimedOut);
    Ok(())
}

#[tokio::test]
async fn ready_after_more_than_a_pipe_buffer_is_seen() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    // 256 KiB of output, well past the 64 KiB default pipe capacity.
    let script = write_script(
        dir.path(),
        "ext",
        "i=0\nwhile [ $i -lt 4096 ]; do\n  echo 'warming up: 0123456789012345678901234567890123456789012345678901'\n  i=$((i + 1))\ndone\necho READY\nsleep 2",
    );

    let outcome = with_timeout(launch_and_await_ready(
        &identity(&script),
        &ReadinessPolicy::default(),
    ))
    .await?;

    assert_eq!(outcome, WrapperOutcome::Ready);
    Ok(())
}

#[tokio::test]
async fn non_executable_wrapper_fails_to_spawn() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let path = write_non_executable(dir.path(), "ext");

    let outcome = with_timeout(launch_and_await_ready(
        &identity(&path),
        &ReadinessPolicy::default(),
    ))
    .await?;

    assert!(
        matches!(outcome, WrapperOutcome::SpawnFailed { .. }),
        "got {outcome:?}"
    );
    Ok(())
}

#[tokio::test]
async fn wrapper_inherits_parent_environment() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let script = write_script(
        dir.path(),
        "ext",
        "if [ -n \"$PATH\" ]; then echo READY; else echo NO_ENV; fi",
    );

    let outcome = with_timeout(launch_and_await_ready(
        &identity(&script),
        &ReadinessPolicy::default(),
    ))
    .await?;

    assert_eq!(outcome, WrapperOutcome::Ready);
    Ok(())
}

#[tokio::test]
async fn full_bootstrap_runs_wrappers_in_order_once() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let log = dir.path().join("order.log");
    let marker = dir.path().join("state").join("marker");

    let first = write_script(
        dir.path(),
        "first",
        &format!("echo first >> {}\necho READY\nsleep 3", log.display()),
    );
    let second = write_script(
        dir.path(),
        "second",
        &format!("echo second >> {}\necho READY", log.display()),
    );
    let host = write_script(dir.path(), "host", &format!("echo host >> {}", log.display()));
    let host_alias = dir.path().join("host-alias");
    std::os::unix::fs::symlink(&host, &host_alias)?;

    let wrappers = format!(
        "{}, {}, {}",
        first.display(),
        host_alias.display(),
        second.display()
    );
    let config = || {
        ConfigBuilder::new(&marker)
            .wrappers(&wrappers)
            .self_path(&host)
            .build()
    };

    let report = with_timeout(run_bootstrap(config())).await?;
    assert_eq!(report.launched().len(), 2);
    assert_eq!(fs::read_to_string(&log)?, "first\nsecond\n");
    assert!(marker.exists());

    // Same sandbox, new process: nothing happens.
    let report = with_timeout(run_bootstrap(config())).await?;
    assert_eq!(report, BootstrapReport::Skipped(SkipReason::AlreadyBootstrapped));
    assert_eq!(fs::read_to_string(&log)?, "first\nsecond\n");

    Ok(())
}

#[tokio::test]
async fn custom_ready_token_is_honoured() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let marker = dir.path().join("marker");
    let script = write_script(dir.path(), "ext", "echo READY\necho listening\nsleep 3");
    let host = write_script(dir.path(), "host", "true");

    let config = ConfigBuilder::new(&marker)
        .wrappers(&script.display().to_string())
        .ready_token("listening")
        .ready_timeout("2s")
        .self_path(&host)
        .build();

    let report = with_timeout(run_bootstrap(config)).await?;

    let BootstrapReport::Completed(reports) = report else {
        panic!("expected completed bootstrap");
    };
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, WrapperOutcome::Ready);
    Ok(())
}
