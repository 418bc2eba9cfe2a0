//! Sentinel resolution - walks up from each input path to the nearest
//! directory containing the sentinel entry (`.git` by default)

use crate::error::{Error, Result};
use path_absolutize::Absolutize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Resolve each path to its nearest marked ancestor.
///
/// Returns unique directories in discovery order. Directory inputs start the
/// search at themselves, anything else (files, paths that do not exist) at
/// the containing directory. The filesystem root is never probed.
///
/// Every probed directory is remembered: once a walk reaches a directory an
/// earlier walk already passed through, its answer is already recorded and
/// the walk stops there.
///
/// # Errors
/// Fails if a path cannot be made absolute.
pub fn resolve<P: AsRef<Path>>(paths: &[P], sentinel: &str) -> Result<Vec<PathBuf>> {
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut found = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let mut current = start_dir(path)?;
        debug!(path = %path.display(), start = %current.display(), sentinel, "searching for sentinel");

        while !visited.contains(&current) {
            // Root reached
            let Some(parent) = current.parent().map(Path::to_path_buf) else {
                break;
            };
            visited.insert(current.clone());

            if has_marker(&current, sentinel) {
                debug!(dir = %current.display(), "found sentinel dir");
                found.push(current);
                break;
            }

            current = parent;
        }
    }

    Ok(found)
}

/// Absolute, lexically normalized directory the walk starts from
fn start_dir(path: &Path) -> Result<PathBuf> {
    let absolute = path
        .absolutize()
        .map_err(|source| Error::Absolute {
            path: path.to_path_buf(),
            source,
        })?
        .into_owned();

    if absolute.is_dir() {
        return Ok(absolute);
    }

    let parent = absolute.parent().map(Path::to_path_buf);
    Ok(parent.unwrap_or(absolute))
}

/// Marker may be a dir or a file (worktrees use a `.git` file). Stat errors count as absent.
fn has_marker(dir: &Path, sentinel: &str) -> bool {
    let marker = dir.join(sentinel);
    match marker.try_exists() {
        Ok(exists) => exists,
        Err(e) => {
            trace!(marker = %marker.display(), error = %e, "stat failed, treating marker as absent");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MARKER: &str = ".herfish-test-marker";

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn mark(dir: &Path) {
        fs::create_dir_all(dir.join(MARKER)).unwrap();
    }

    #[test]
    fn test_shared_ancestor_appears_once() {
        let tmp = TempDir::new().unwrap();
        let r1 = tmp.path().join("r1");
        let r2 = tmp.path().join("r2");
        mark(&r1);
        mark(&r2);
        touch(&r1.join("a/x.go"));
        touch(&r1.join("b/y.go"));
        touch(&r2.join("z.go"));

        let paths = [r1.join("a/x.go"), r1.join("b/y.go"), r2.join("z.go")];
        let dirs = resolve(&paths, MARKER).unwrap();

        assert_eq!(dirs, vec![r1, r2]);
    }

    #[test]
    fn test_discovery_order_is_kept() {
        let tmp = TempDir::new().unwrap();
        let r1 = tmp.path().join("r1");
        let r2 = tmp.path().join("r2");
        mark(&r1);
        mark(&r2);
        touch(&r1.join("x"));
        touch(&r2.join("y"));

        let dirs = resolve(&[r2.join("y"), r1.join("x")], MARKER).unwrap();

        assert_eq!(dirs, vec![r2, r1]);
    }

    #[test]
    fn test_no_marker_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("plain/file.txt"));

        let dirs = resolve(&[tmp.path().join("plain/file.txt")], MARKER).unwrap();

        assert!(dirs.is_empty());
    }

    #[test]
    fn test_directory_input_starts_at_itself() {
        let tmp = TempDir::new().unwrap();
        let outer = tmp.path().join("outer");
        let inner = outer.join("inner");
        mark(&outer);
        mark(&inner);
        touch(&outer.join("f"));

        // Directory in any position, not just first
        let dirs = resolve(&[outer.join("f"), inner.clone()], MARKER).unwrap();

        assert_eq!(dirs, vec![outer, inner]);
    }

    #[test]
    fn test_nearest_marker_wins() {
        let tmp = TempDir::new().unwrap();
        let outer = tmp.path().join("outer");
        let nested = outer.join("vendor/nested");
        mark(&outer);
        mark(&nested);
        touch(&nested.join("src/lib.rs"));
        touch(&outer.join("README"));

        let dirs = resolve(&[nested.join("src/lib.rs"), outer.join("README")], MARKER).unwrap();

        assert_eq!(dirs, vec![nested, outer]);
    }

    #[test]
    fn test_marker_file_counts() {
        let tmp = TempDir::new().unwrap();
        let worktree = tmp.path().join("wt");
        touch(&worktree.join(MARKER));
        touch(&worktree.join("code.rs"));

        let dirs = resolve(&[worktree.join("code.rs")], MARKER).unwrap();

        assert_eq!(dirs, vec![worktree]);
    }

    #[test]
    fn test_missing_path_uses_parent() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        mark(&repo);
        fs::create_dir_all(repo.join("src")).unwrap();

        let dirs = resolve(&[repo.join("src/deleted.rs")], MARKER).unwrap();

        assert_eq!(dirs, vec![repo]);
    }

    #[test]
    fn test_dot_segments_are_normalized() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        mark(&repo);
        touch(&repo.join("a/x"));
        touch(&repo.join("b/y"));

        let paths = [repo.join("a/x"), repo.join("a/../b/y")];
        let dirs = resolve(&paths, MARKER).unwrap();

        assert_eq!(dirs, vec![repo]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let r1 = tmp.path().join("r1");
        mark(&r1);
        touch(&r1.join("a/b/c"));
        touch(&tmp.path().join("loose"));

        let paths = [r1.join("a/b/c"), tmp.path().join("loose"), r1.clone()];
        let first = resolve(&paths, MARKER).unwrap();
        let second = resolve(&paths, MARKER).unwrap();

        assert_eq!(first, vec![r1]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_stat_error_counts_as_absent() {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        mark(&repo);
        touch(&repo.join("afile"));

        // Probing `afile/<marker>` fails with ENOTDIR, walk moves on to `repo`
        let dirs = resolve(&[repo.join("afile/child")], MARKER).unwrap();

        assert_eq!(dirs, vec![repo]);
    }

    #[test]
    fn test_empty_batch() {
        let paths: [PathBuf; 0] = [];
        assert!(resolve(&paths, MARKER).unwrap().is_empty());
    }
}
