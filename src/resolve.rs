// src/resolve.rs

//! Wrapper resolution.
//!
//! Turns the comma-separated `AWS_LAMBDA_EXEC_WRAPPER` value into the list of
//! executables to launch. Both the wrappers and the current executable are
//! canonicalized through the same [`FileSystem`], so a wrapper listed under a
//! symlink or relative alias of ourselves is still recognised and skipped.

use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::fs::FileSystem;
use crate::types::{CanonicalIdentity, WrapperSpec};

/// Split a raw wrapper list on commas, trimming whitespace and dropping empty
/// entries. Order is preserved and duplicates are kept.
pub fn parse_wrapper_list(raw: &str) -> Vec<WrapperSpec> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(WrapperSpec::new)
        .collect()
}

/// Resolve `raw` to canonical wrapper identities, excluding `self_path`.
///
/// - If our own identity cannot be determined, nothing is returned: the
///   self-comparison is what prevents recursive bootstrapping.
/// - An entry that cannot be canonicalized is skipped; the others are still
///   resolved.
/// - Duplicate entries resolve to duplicate identities.
pub fn resolve_wrappers<F: FileSystem + ?Sized>(
    fs: &F,
    raw: &str,
    self_path: &Path,
) -> Vec<CanonicalIdentity> {
    let specs = parse_wrapper_list(raw);
    if specs.is_empty() {
        debug!("no exec wrappers configured");
        return Vec::new();
    }

    let self_identity = match fs.canonicalize(self_path) {
        Ok(p) => CanonicalIdentity::from_canonical(p),
        Err(err) => {
            error!(
                self_path = ?self_path,
                error = %err,
                "could not determine own executable path; skipping wrapper bootstrap"
            );
            return Vec::new();
        }
    };

    let mut resolved = Vec::with_capacity(specs.len());
    for spec in specs {
        let identity = match fs.canonicalize(spec.as_path()) {
            Ok(p) => CanonicalIdentity::from_canonical(p),
            Err(err) => {
                warn!(wrapper = %spec, error = %err, "failed to resolve exec wrapper; skipping");
                continue;
            }
        };

        if identity == self_identity {
            info!(wrapper = %spec, "skipping self invocation");
            continue;
        }

        debug!(wrapper = %spec, resolved = %identity, "resolved exec wrapper");
        resolved.push(identity);
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use std::path::PathBuf;

    fn paths(ids: &[CanonicalIdentity]) -> Vec<PathBuf> {
        ids.iter().map(|i| i.as_path().to_path_buf()).collect()
    }

    #[test]
    fn parse_trims_and_drops_empty_entries() {
        let specs = parse_wrapper_list(" /a/b , ,/c,, ");
        let raw: Vec<_> = specs.iter().map(WrapperSpec::as_str).collect();
        assert_eq!(raw, vec!["/a/b", "/c"]);
    }

    #[test]
    fn parse_of_separators_only_is_empty() {
        assert!(parse_wrapper_list("").is_empty());
        assert!(parse_wrapper_list(" , ,,").is_empty());
    }

    #[test]
    fn unresolvable_entry_does_not_abort_others() {
        let fs = MockFileSystem::new();
        fs.add_file("/opt/host", b"".to_vec());
        fs.add_file("/opt/ext/one", b"".to_vec());
        fs.add_file("/opt/ext/two", b"".to_vec());

        let ids = resolve_wrappers(&fs, "/opt/ext/one,/missing,/opt/ext/two", Path::new("/opt/host"));
        assert_eq!(
            paths(&ids),
            vec![PathBuf::from("/opt/ext/one"), PathBuf::from("/opt/ext/two")]
        );
    }

    #[test]
    fn unknown_self_path_resolves_nothing() {
        let fs = MockFileSystem::new();
        fs.add_file("/opt/ext/one", b"".to_vec());

        let ids = resolve_wrappers(&fs, "/opt/ext/one", Path::new("/does/not/exist"));
        assert!(ids.is_empty());
    }

    #[test]
    fn self_is_skipped_under_any_alias() {
        let fs = MockFileSystem::new().with_cwd("/var/task");
        fs.add_file("/var/task/bin/host", b"".to_vec());
        fs.add_symlink("/opt/extensions/host-link", "/var/task/bin/host");
        fs.add_symlink("/var/task/bootstrap", "bin/host");
        fs.add_file("/opt/extensions/other", b"".to_vec());

        let ids = resolve_wrappers(
            &fs,
            "/opt/extensions/host-link, ./bin/host, bootstrap, /opt/extensions/other, /var/task/bin/../bin/host",
            Path::new("/var/task/bootstrap"),
        );
        assert_eq!(paths(&ids), vec![PathBuf::from("/opt/extensions/other")]);
    }

    #[test]
    fn duplicates_are_preserved_in_order() {
        let fs = MockFileSystem::new();
        fs.add_file("/usr/local/bin/host", b"".to_vec());
        fs.add_file("/bin/true", b"".to_vec());
        fs.add_symlink("/usr/bin/true", "/bin/true");

        let ids = resolve_wrappers(&fs, "/bin/true,/usr/bin/true", Path::new("/usr/local/bin/host"));
        assert_eq!(
            paths(&ids),
            vec![PathBuf::from("/bin/true"), PathBuf::from("/bin/true")]
        );
    }
}
