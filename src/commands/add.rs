//! Track a new repository and clone it

use anyhow::Result;
use std::path::PathBuf;

use crate::fleet::{CloneOutcome, Fleet};
use crate::registry::{Registry, RepoRecord};

/// Handles `fleet add <url>`
pub async fn handle_add(root: PathBuf, url: String, category: String) -> Result<()> {
    let mut registry = Registry::load_or_default(&root)?;
    let record = RepoRecord::new(url, category.parse()?);

    let fleet = Fleet::new(&root, &registry);
    match fleet.clone_repo(&record).await? {
        CloneOutcome::Cloned => {
            println!("🟢 Cloned {} to {}", record.url, record.local_path(&root).display());
        }
        CloneOutcome::AlreadyExists => {
            println!("🟠 {} already checked out", record.url);
        }
    }

    if registry.add(record) {
        registry.save(&root)?;
    } else {
        println!("Repo already tracked, not adding");
    }
    Ok(())
}
