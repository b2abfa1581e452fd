// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod guard;
pub mod logging;
pub mod resolve;
pub mod types;

use std::process::Stdio;

use anyhow::{bail, Context};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::{load_from_env, BootstrapConfig};
use crate::engine::{BootstrapReport, Bootstrapper};
use crate::errors::Result;
use crate::exec::RealLaunchBackend;
use crate::fs::RealFileSystem;
use crate::guard::MarkerFileState;
use crate::resolve::resolve_wrappers;

/// Run the wrapper bootstrap with production collaborators: the marker file
/// at `config.marker_path`, the real filesystem and real child processes.
///
/// Fatal conditions are returned as errors; the caller decides whether to
/// terminate. Children launched here keep draining on the current Tokio
/// runtime, so call this from the runtime that hosts the function.
pub async fn run_bootstrap(config: BootstrapConfig) -> Result<BootstrapReport> {
    let state = MarkerFileState::new(config.marker_path);
    debug!(marker = ?state.path(), "checking bootstrap marker");
    let launcher = RealLaunchBackend::new(config.readiness);

    let mut bootstrapper = Bootstrapper::new(state, RealFileSystem, launcher)
        .with_wrappers(config.wrappers)
        .with_self_path(config.self_path);
    bootstrapper.run().await
}

/// Entry point for a function binary that is itself listed in
/// `AWS_LAMBDA_EXEC_WRAPPER`.
///
/// Reads configuration from the environment and runs the bootstrap. A fatal
/// error (broken stdout pipe of a wrapper) is logged and terminates the
/// process with exit code 1. Configuration errors are returned.
pub async fn init_lambda() -> Result<BootstrapReport> {
    let config = load_from_env(None)?;

    match run_bootstrap(config).await {
        Err(err) if err.is_fatal() => {
            error!(error = %err, "fatal error during wrapper bootstrap; aborting");
            std::process::exit(1);
        }
        other => other,
    }
}

/// High-level entry point used by `main.rs`. Returns the exit code.
///
/// This wires together:
/// - config loading (file, environment, CLI overrides)
/// - the bootstrap sequence
/// - the optional trailing command
pub async fn run(args: CliArgs) -> anyhow::Result<i32> {
    let config = effective_config(&args)?;

    if args.dry_run {
        print_dry_run(&config);
        return Ok(0);
    }

    let report = run_bootstrap(config).await?;
    info!(?report, "bootstrap finished");

    run_command(&args.command).await
}

/// Apply CLI overrides on top of the environment/file config.
fn effective_config(args: &CliArgs) -> Result<BootstrapConfig> {
    let mut config = load_from_env(args.config.as_deref())?;

    if let Some(ref wrappers) = args.wrappers {
        config.wrappers = Some(wrappers.clone());
    }
    if let Some(ref path) = args.marker_path {
        config.marker_path = path.clone();
    }
    if let Some(timeout) = args.ready_timeout {
        config.readiness.timeout = Some(timeout);
    }
    if let Some(ref path) = args.self_path {
        config.self_path = Some(path.clone());
    }

    Ok(config)
}

/// Run the wrapped command with inherited stdio and return its exit code.
///
/// While it runs, the Tokio runtime stays up and keeps draining the stdout
/// of launched wrappers.
async fn run_command(command: &[String]) -> anyhow::Result<i32> {
    let Some((program, rest)) = command.split_first() else {
        return Ok(0);
    };

    info!(program = %program, "running wrapped command");
    let status = Command::new(program)
        .args(rest)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .with_context(|| format!("running wrapped command '{program}'"))?;

    match status.code() {
        Some(code) => Ok(code),
        None => bail!("wrapped command '{program}' terminated by a signal"),
    }
}

/// Print what a real run would launch, without touching the marker or
/// spawning anything.
fn print_dry_run(config: &BootstrapConfig) {
    println!("icebreak dry-run");
    println!("  marker_path = {}", config.marker_path.display());
    println!("  ready = {:?}", config.readiness.matcher);
    println!("  ready_timeout = {:?}", config.readiness.timeout);
    println!();

    let raw = config.wrappers.as_deref().unwrap_or("");
    let self_path = config
        .self_path
        .clone()
        .or_else(|| std::env::current_exe().ok());

    let Some(self_path) = self_path else {
        println!("wrappers: (self path unknown; nothing would be launched)");
        return;
    };

    let wrappers = resolve_wrappers(&RealFileSystem, raw, &self_path);
    println!("wrappers ({}):", wrappers.len());
    for wrapper in wrappers {
        println!("  - {wrapper}");
    }
}
