//! Test fixtures for fleet-level scenarios

use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

use repo_fleet::registry::{Category, Registry, RepoRecord};

/// A fleet root with a registry and fake checkouts, removed on drop
pub struct FleetFixture {
    pub temp_dir: TempDir,
    pub registry: Registry,
}

impl FleetFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create fleet temp dir"),
            registry: Registry::default(),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().to_path_buf()
    }

    /// Tracks a repository and materializes its checkout with the given files
    pub fn add_checkout(
        &mut self,
        url: &str,
        category: Category,
        files: &[(&str, &str)],
    ) -> Result<RepoRecord> {
        let record = RepoRecord::new(url, category);
        let path = record.local_path(self.temp_dir.path());
        std::fs::create_dir_all(&path)?;
        for (name, content) in files {
            let file = path.join(name);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(file, content)?;
        }
        self.registry.merge(vec![record.clone()]);
        Ok(record)
    }

    /// Tracks a repository without creating its checkout
    pub fn add_tracked_only(&mut self, url: &str, category: Category) -> RepoRecord {
        let record = RepoRecord::new(url, category);
        self.registry.merge(vec![record.clone()]);
        record
    }

    /// Local roots of every tracked repository
    pub fn roots(&self) -> Vec<PathBuf> {
        let root = self.root();
        self.registry
            .repos
            .iter()
            .map(|r| r.local_path(&root))
            .collect()
    }
}
