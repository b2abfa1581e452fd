// src/guard/marker.rs

//! Marker-file backed [`BootstrapState`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::fs::{FileSystem, RealFileSystem};

use super::BootstrapState;

/// Where the marker lives unless configured otherwise. `/tmp` is the one
/// writable location that survives for the lifetime of a Lambda sandbox.
pub const DEFAULT_MARKER_PATH: &str = "/tmp/icebreak_marker";

/// Written for humans poking around the sandbox; never parsed.
pub const MARKER_CONTENTS: &[u8] = b"READY";

/// Owner read/write only.
pub const MARKER_MODE: u32 = 0o600;

/// Presence of a file at `path` means bootstrap was already attempted.
#[derive(Debug, Clone)]
pub struct MarkerFileState<F: FileSystem = RealFileSystem> {
    fs: F,
    path: PathBuf,
}

impl MarkerFileState<RealFileSystem> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(RealFileSystem, path)
    }
}

impl<F: FileSystem> MarkerFileState<F> {
    pub fn with_fs(fs: F, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<F: FileSystem> BootstrapState for MarkerFileState<F> {
    fn has_run(&self) -> bool {
        self.fs.exists(&self.path)
    }

    fn mark_run(&self) -> Result<()> {
        self.fs
            .write_with_mode(&self.path, MARKER_CONTENTS, MARKER_MODE)
            .with_context(|| format!("writing bootstrap marker {:?}", self.path))?;
        debug!(path = ?self.path, "bootstrap marker written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::guard::should_bootstrap;

    #[test]
    fn marker_is_written_with_owner_only_mode() {
        let fs = MockFileSystem::new();
        let state = MarkerFileState::with_fs(fs.clone(), "/tmp/marker");

        assert!(!state.has_run());
        state.mark_run().unwrap();

        assert!(state.has_run());
        assert_eq!(fs.file_contents("/tmp/marker").as_deref(), Some(MARKER_CONTENTS));
        assert_eq!(fs.file_mode("/tmp/marker"), Some(MARKER_MODE));
    }

    #[test]
    fn existing_marker_content_is_not_inspected() {
        let fs = MockFileSystem::new();
        fs.add_file("/tmp/marker", b"garbage".to_vec());
        let state = MarkerFileState::with_fs(fs, "/tmp/marker");

        assert!(!should_bootstrap(&state));
    }

    #[test]
    fn unwritable_marker_still_allows_bootstrap() {
        let fs = MockFileSystem::new();
        fs.fail_writes(true);
        let state = MarkerFileState::with_fs(fs, "/tmp/marker");

        assert!(should_bootstrap(&state));
        assert!(!state.has_run());
    }
}
