// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only the conditions the bootstrap sequence cannot recover from surface as
//! errors. Unresolvable wrappers, spawn failures and marker write failures are
//! logged and skipped where they happen.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("stdout pipe unavailable for wrapper {0:?}")]
    PipeUnavailable(PathBuf),

    #[error("failed reading stdout of wrapper {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BootstrapError {
    /// Whether this error must terminate the host process.
    ///
    /// A broken readiness channel means no later wrapper can be trusted to
    /// have a sane stdout either.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BootstrapError::PipeUnavailable(_) | BootstrapError::ReadFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
