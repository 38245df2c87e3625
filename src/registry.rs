//! Registry of tracked repositories
//!
//! The registry is a JSON document at `<root>/.fleet.json` holding an ordered
//! list of `{url, category}` records. It is read wholesale into memory,
//! mutated, and rewritten wholesale; concurrent writers from multiple
//! processes are not supported.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name of the registry document under the fleet root
pub const REGISTRY_FILE: &str = ".fleet.json";

/// Classification of a tracked repository
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Runtime,
    Sdk,
    Pdk,
    Other,
}

impl Category {
    /// Returns the text representation of this category
    pub fn text(&self) -> &str {
        match self {
            Category::Runtime => "runtime",
            Category::Sdk => "sdk",
            Category::Pdk => "pdk",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "runtime" => Ok(Category::Runtime),
            "sdk" => Ok(Category::Sdk),
            "pdk" => Ok(Category::Pdk),
            "other" => Ok(Category::Other),
            _ => anyhow::bail!("Unknown category '{s}' (expected runtime, sdk, pdk or other)"),
        }
    }
}

/// One tracked repository: its clone URL and category
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RepoRecord {
    pub url: String,
    pub category: Category,
}

impl RepoRecord {
    pub fn new(url: impl Into<String>, category: Category) -> Self {
        Self {
            url: url.into(),
            category,
        }
    }

    /// Splits the clone URL into (owner, name) using its last two segments.
    /// SSH-style `git@host:owner/name` URLs are normalized the same way.
    pub fn owner_and_name(&self) -> (String, String) {
        let trimmed = self.url.trim_end_matches('/').trim_end_matches(".git");
        let mut segments: Vec<&str> = trimmed.split('/').collect();
        let name = segments.pop().unwrap_or_default().to_string();
        let mut owner = segments.pop().unwrap_or_default().to_string();
        if self.url.starts_with("git@") {
            if let Some((_, after_colon)) = owner.split_once(':') {
                owner = after_colon.to_string();
            }
        }
        (owner, name)
    }

    /// Deterministic local checkout path: `<root>/<owner>/<name>`
    pub fn local_path(&self, root: &Path) -> PathBuf {
        let (owner, name) = self.owner_and_name();
        root.join(owner).join(name)
    }
}

/// The durable set of tracked repositories
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Registry {
    pub repos: Vec<RepoRecord>,
}

impl Registry {
    fn file_path(root: &Path) -> PathBuf {
        root.join(REGISTRY_FILE)
    }

    /// Loads the registry from `<root>/.fleet.json`.
    /// A missing or malformed file is fatal; callers that tolerate a missing
    /// registry (init) use [`Registry::load_or_default`].
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::file_path(root);
        tracing::debug!("loading registry from {}", path.display());
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("Unable to read registry file {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Registry file {} is not valid JSON", path.display()))
    }

    /// Loads the registry, or returns an empty one when the file does not exist
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = Self::file_path(root);
        if path.exists() {
            Self::load(root)
        } else {
            Ok(Self::default())
        }
    }

    /// Rewrites the registry file wholesale
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = Self::file_path(root);
        tracing::debug!("saving registry to {}", path.display());
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, data)
            .with_context(|| format!("Unable to write registry file {}", path.display()))
    }

    /// Merges `incoming` records into the registry. Records are unique by
    /// URL; an incoming record replaces an existing one with the same URL.
    /// The result is ordered by (category, url).
    pub fn merge(&mut self, incoming: Vec<RepoRecord>) {
        for record in incoming {
            match self.repos.iter_mut().find(|r| r.url == record.url) {
                Some(existing) => *existing = record,
                None => self.repos.push(record),
            }
        }
        self.repos
            .sort_by(|a, b| (a.category, &a.url).cmp(&(b.category, &b.url)));
    }

    /// Adds a single record unless its URL is already tracked.
    /// Returns false when the URL was already present.
    pub fn add(&mut self, record: RepoRecord) -> bool {
        if self.repos.iter().any(|r| r.url == record.url) {
            return false;
        }
        self.merge(vec![record]);
        true
    }

    /// Removes every record whose URL ends with `suffix`, returning the
    /// removed records. Suffix matching lets callers pass `owner/name` or a
    /// bare repository name instead of the full clone URL.
    pub fn remove(&mut self, suffix: &str) -> Vec<RepoRecord> {
        let removed: Vec<RepoRecord> = self
            .repos
            .iter()
            .filter(|r| r.url.ends_with(suffix))
            .cloned()
            .collect();
        self.repos.retain(|r| !r.url.ends_with(suffix));
        removed
    }

    /// Selects records passing an optional category filter and an optional
    /// regex filter on the URL
    pub fn select(&self, category: Option<Category>, url_filter: Option<&Regex>) -> Vec<RepoRecord> {
        self.repos
            .iter()
            .filter(|r| category.map_or(true, |c| r.category == c))
            .filter(|r| url_filter.map_or(true, |rx| rx.is_match(&r.url)))
            .cloned()
            .collect()
    }

    /// Local path of the first Runtime-category checkout, when one exists.
    /// Exported to spawned processes as `FLEET_RUNTIME`.
    pub fn runtime_path(&self, root: &Path) -> Option<PathBuf> {
        self.repos
            .iter()
            .find(|r| r.category == Category::Runtime)
            .map(|r| r.local_path(root))
    }
}
