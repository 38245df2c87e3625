//! Ignore-aware file traversal
//!
//! One [`FileWalk`] covers one root: a lazy, finite iterator over the
//! absolute paths of every regular file reachable from the root. Ignore
//! rules come from the root's own version-control configuration when present
//! (the `.gitignore` chain); without one, nothing is filtered. Symlinks and
//! non-regular files are always skipped, and `.git` itself is never entered.

use ignore::{DirEntry, Walk, WalkBuilder};
use std::path::{Path, PathBuf};

/// Lazy, non-restartable traversal of the regular files under one root.
///
/// Yields `Err` for entries (including the root itself) that cannot be read;
/// callers report those and keep iterating, so one unreadable subtree never
/// hides the rest of the root.
pub struct FileWalk {
    inner: Walk,
}

impl FileWalk {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = absolute(root.as_ref());
        let inner = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false)
            .follow_links(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();
        Self { inner }
    }
}

impl Iterator for FileWalk {
    type Item = Result<PathBuf, ignore::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) => {
                    if is_regular_file(&entry) {
                        return Some(Ok(entry.into_path()));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Regular files only: directories, symlinks and special files are skipped.
/// `file_type()` is the entry's own type (links are not followed), so a
/// symlink to a file does not count.
fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_file())
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collect_files(root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = FileWalk::new(root).filter_map(|e| e.ok()).collect();
        files.sort();
        files
    }

    #[test]
    fn test_walk_yields_every_regular_file_once() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/b.txt"), "b").unwrap();

        let files = collect_files(root);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.is_absolute()));
        assert!(files.iter().any(|p| p.ends_with("a.txt")));
        assert!(files.iter().any(|p| p.ends_with("sub/b.txt")));
    }

    #[test]
    fn test_gitignore_rules_are_honored() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".gitignore"), "ignored.txt\nbuild/\n").unwrap();
        fs::write(root.join("kept.txt"), "kept").unwrap();
        fs::write(root.join("ignored.txt"), "ignored").unwrap();
        fs::create_dir(root.join("build")).unwrap();
        fs::write(root.join("build/out.txt"), "out").unwrap();

        let files = collect_files(root);
        assert!(files.iter().any(|p| p.ends_with("kept.txt")));
        // .gitignore itself is a regular file and not ignored
        assert!(files.iter().any(|p| p.ends_with(".gitignore")));
        assert!(!files.iter().any(|p| p.ends_with("ignored.txt")));
        assert!(!files.iter().any(|p| p.ends_with("out.txt")));
    }

    #[test]
    fn test_git_dir_is_never_entered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::write(root.join(".git/config"), "[core]").unwrap();
        fs::write(root.join("code.rs"), "fn main() {}").unwrap();

        let files = collect_files(root);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("code.rs"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("real.txt"), "real").unwrap();
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt")).unwrap();

        let files = collect_files(root);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("real.txt"));
    }

    #[test]
    fn test_missing_root_reports_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("no-such-dir");

        let entries: Vec<_> = FileWalk::new(&missing).collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_err());
    }
}
