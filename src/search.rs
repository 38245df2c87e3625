//! Cross-repository content and filename search
//!
//! A [`Search`] composes the ignore-aware walker with optional content and
//! filename filters and streams matching paths to a callback. Each root is
//! traversed on its own blocking worker, so the callback can fire
//! concurrently; callers serialize their own side effects. No result list is
//! accumulated internally, so memory stays flat no matter how large the
//! fleet is.

use anyhow::{Context, Result};
use regex::bytes;
use regex::Regex;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::walk::FileWalk;

/// Immutable content/filename filter pair.
///
/// Construction is the only place a malformed pattern can surface; both
/// engines refuse to start with an invalid query.
pub struct SearchQuery {
    content: Option<bytes::Regex>,
    filename: Option<Regex>,
}

impl SearchQuery {
    pub fn new(content: Option<&str>, filename: Option<&str>) -> Result<Self> {
        let content = content
            .filter(|p| !p.is_empty())
            .map(bytes::Regex::new)
            .transpose()
            .context("Invalid content pattern")?;
        let filename = filename
            .filter(|p| !p.is_empty())
            .map(Regex::new)
            .transpose()
            .context("Invalid filename pattern")?;
        Ok(Self { content, filename })
    }

    pub fn content(&self) -> Option<&bytes::Regex> {
        self.content.as_ref()
    }

    /// Filename filter applied to the absolute path, before the file is
    /// opened. A file with no match is skipped without a single read.
    pub fn matches_filename(&self, path: &Path) -> bool {
        match &self.filename {
            Some(rx) => rx.is_match(&path.to_string_lossy()),
            None => true,
        }
    }
}

/// Streaming search across a set of repository roots
pub struct Search {
    query: Arc<SearchQuery>,
    roots: Vec<PathBuf>,
}

impl Search {
    pub fn new(query: SearchQuery, roots: Vec<PathBuf>) -> Self {
        Self {
            query: Arc::new(query),
            roots,
        }
    }

    pub fn query(&self) -> &Arc<SearchQuery> {
        &self.query
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Walks every root concurrently, invoking `on_match` with the absolute
    /// path of each file that passes both filters. Returns once every root's
    /// traversal has finished. Unreadable roots and per-file read errors are
    /// reported and skipped; they never abort sibling roots.
    pub async fn for_each<F>(&self, on_match: F)
    where
        F: Fn(&Path) + Send + Sync + 'static,
    {
        let on_match = Arc::new(on_match);
        let handles: Vec<_> = self
            .roots
            .iter()
            .cloned()
            .map(|root| {
                let query = Arc::clone(&self.query);
                let on_match = Arc::clone(&on_match);
                tokio::task::spawn_blocking(move || search_root(&root, &query, &*on_match))
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                tracing::warn!("search worker panicked: {e}");
            }
        }
    }
}

/// Sequential walk of one root. Runs on a blocking worker thread.
fn search_root(root: &Path, query: &SearchQuery, on_match: &(dyn Fn(&Path) + Send + Sync)) {
    for entry in FileWalk::new(root) {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Error in {}: {e}", root.display());
                continue;
            }
        };

        if !query.matches_filename(&path) {
            continue;
        }

        match query.content() {
            None => on_match(&path),
            Some(rx) => match content_matches(&path, rx) {
                Ok(true) => on_match(&path),
                Ok(false) => {}
                Err(e) => eprintln!("Error reading {}: {e}", path.display()),
            },
        }
    }
}

/// Streams the file through the matcher line by line, so memory is bounded
/// by the longest line rather than the file size
fn content_matches(path: &Path, rx: &bytes::Regex) -> std::io::Result<bool> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(false);
        }
        if rx.is_match(&line) {
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    async fn run_search(query: SearchQuery, roots: Vec<PathBuf>) -> Vec<PathBuf> {
        let matches = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&matches);
        Search::new(query, roots)
            .for_each(move |path| sink.lock().unwrap().push(path.to_path_buf()))
            .await;
        let mut found = matches.lock().unwrap().clone();
        found.sort();
        found
    }

    #[tokio::test]
    async fn test_content_pattern_selects_matching_file_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("f1"), "needle").unwrap();
        fs::write(root.join("f2"), "hay").unwrap();

        let query = SearchQuery::new(Some("needle"), None).unwrap();
        let found = run_search(query, vec![root.to_path_buf()]).await;

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("f1"));
    }

    #[tokio::test]
    async fn test_filename_filter_skips_without_reading() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.txt"), "x").unwrap();
        fs::write(root.join("a.md"), "x").unwrap();

        let query = SearchQuery::new(Some("x"), Some(r"\.txt$")).unwrap();
        let found = run_search(query, vec![root.to_path_buf()]).await;

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("a.txt"));
    }

    #[tokio::test]
    async fn test_no_content_pattern_yields_all_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("one"), "").unwrap();
        fs::write(root.join("two"), "").unwrap();

        let query = SearchQuery::new(None, None).unwrap();
        let found = run_search(query, vec![root.to_path_buf()]).await;

        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_root_does_not_block_valid_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("f1"), "needle").unwrap();
        let missing = root.join("no-such-root");

        let query = SearchQuery::new(Some("needle"), None).unwrap();
        let found = run_search(query, vec![missing, root.to_path_buf()]).await;

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("f1"));
    }

    #[tokio::test]
    async fn test_gitignored_file_is_never_visited() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".gitignore"), "secret.txt\n").unwrap();
        fs::write(root.join("secret.txt"), "needle").unwrap();
        fs::write(root.join("plain.txt"), "needle").unwrap();

        let query = SearchQuery::new(Some("needle"), None).unwrap();
        let found = run_search(query, vec![root.to_path_buf()]).await;

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("plain.txt"));
    }

    #[test]
    fn test_malformed_pattern_fails_at_construction() {
        assert!(SearchQuery::new(Some("("), None).is_err());
        assert!(SearchQuery::new(None, Some("[")).is_err());
    }
}
