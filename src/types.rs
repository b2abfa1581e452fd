// src/types.rs

//! Path newtypes shared by the resolver and the supervisor.

use std::fmt;
use std::path::{Path, PathBuf};

/// One entry of the configured wrapper list, as written by the user
/// (already trimmed, never empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperSpec {
    raw: String,
}

impl WrapperSpec {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.raw)
    }
}

impl fmt::Display for WrapperSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Absolute, symlink-free path of an executable.
///
/// Two identities are the same executable iff their paths are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalIdentity(PathBuf);

impl CanonicalIdentity {
    /// Wrap a path that has already been canonicalized.
    pub fn from_canonical(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for CanonicalIdentity {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CanonicalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
