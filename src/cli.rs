// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::exec::readiness::parse_duration;

/// Command-line arguments for `icebreak`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "icebreak",
    version,
    about = "Launch the other configured Lambda exec wrappers and wait for them to be ready.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional TOML config file.
    ///
    /// Default: `ICEBREAK_CONFIG`, if set.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ICEBREAK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Comma-separated wrapper list; overrides `AWS_LAMBDA_EXEC_WRAPPER`.
    #[arg(long, value_name = "LIST")]
    pub wrappers: Option<String>,

    /// Location of the bootstrap marker file.
    #[arg(long, value_name = "PATH")]
    pub marker_path: Option<PathBuf>,

    /// Give up waiting for each wrapper after this long (e.g. `5s`, `250ms`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub ready_timeout: Option<Duration>,

    /// Treat this path as our own executable when filtering self-references.
    #[arg(long, value_name = "PATH")]
    pub self_path: Option<PathBuf>,

    /// Resolve and print the wrappers that would be launched, then exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Command to run once bootstrap is done (the runtime command an exec
    /// wrapper receives). Its exit code becomes ours.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
