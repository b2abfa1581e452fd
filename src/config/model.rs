// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::ReadinessPolicy;

/// Configuration as read from an optional TOML file, before environment
/// overrides and validation.
///
/// ```toml
/// [bootstrap]
/// marker_path = "/tmp/icebreak_marker"
/// ready_token = "READY"
/// ready_pattern = "^listening on \\d+$"
/// ready_timeout = "5s"
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub bootstrap: BootstrapSection,
}

/// `[bootstrap]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapSection {
    /// Where the bootstrap marker file lives.
    pub marker_path: Option<PathBuf>,

    /// Substring that marks a readiness line. Default `READY`.
    pub ready_token: Option<String>,

    /// Regex that marks a readiness line; takes precedence over
    /// `ready_token`.
    pub ready_pattern: Option<String>,

    /// Maximum time to wait for each wrapper, e.g. `"5s"`. Unset waits until
    /// the wrapper is ready or exits.
    pub ready_timeout: Option<String>,

    /// Raw wrapper list. Only ever filled from `AWS_LAMBDA_EXEC_WRAPPER` or
    /// the CLI, never from the file.
    #[serde(skip)]
    pub wrappers: Option<String>,
}

/// Validated configuration for one bootstrap call.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub wrappers: Option<String>,
    pub marker_path: PathBuf,
    pub readiness: ReadinessPolicy,
    /// Overrides [`std::env::current_exe`] for self detection.
    pub self_path: Option<PathBuf>,
}
