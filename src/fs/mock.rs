// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Upper bound on symlink hops, mirroring the kernel's ELOOP limit.
const MAX_SYMLINK_HOPS: usize = 40;

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { contents: Vec<u8>, mode: u32 },
    Symlink(PathBuf),
}

/// In-memory filesystem with just enough semantics for path resolution.
///
/// Relative paths are interpreted against `cwd` (default `/`). Parent
/// directories are implicit.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    cwd: PathBuf,
    fail_writes: Arc<AtomicBool>,
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            cwd: PathBuf::from("/"),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = self.absolute(path.as_ref());
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            path,
            MockEntry::File {
                contents: content.into(),
                mode: 0o755,
            },
        );
    }

    /// Make `link` point at `target` (which may itself be relative to the
    /// link's directory, as with a real symlink).
    pub fn add_symlink(&self, link: impl AsRef<Path>, target: impl AsRef<Path>) {
        let link = self.absolute(link.as_ref());
        let mut entries = self.entries.lock().unwrap();
        entries.insert(link, MockEntry::Symlink(target.as_ref().to_path_buf()));
    }

    /// Make every subsequent write fail, to exercise best-effort callers.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let path = self.absolute(path.as_ref());
        let entries = self.entries.lock().unwrap();
        match entries.get(&path) {
            Some(MockEntry::File { contents, .. }) => Some(contents.clone()),
            _ => None,
        }
    }

    pub fn file_mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        let path = self.absolute(path.as_ref());
        let entries = self.entries.lock().unwrap();
        match entries.get(&path) {
            Some(MockEntry::File { mode, .. }) => Some(*mode),
            _ => None,
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        normalize(&self.cwd.join(path))
    }
}

/// Lexically collapse `.` and `..` components of an absolute path.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    out
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.canonicalize(path).is_ok()
    }

    fn write_with_mode(&self, path: &Path, contents: &[u8], mode: u32) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("write refused for {:?}", path);
        }
        let path = self.absolute(path);
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            path,
            MockEntry::File {
                contents: contents.to_vec(),
                mode,
            },
        );
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let entries = self.entries.lock().unwrap();
        let mut current = self.absolute(path);

        for _ in 0..MAX_SYMLINK_HOPS {
            match entries.get(&current) {
                Some(MockEntry::File { .. }) => return Ok(current),
                Some(MockEntry::Symlink(target)) => {
                    let base = current.parent().unwrap_or(Path::new("/")).to_path_buf();
                    current = normalize(&base.join(target));
                }
                None => return Err(anyhow!("No such file or directory: {:?}", path)),
            }
        }

        Err(anyhow!("Too many levels of symbolic links: {:?}", path))
    }
}
