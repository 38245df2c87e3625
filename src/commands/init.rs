//! Fleet initialization: merge a manifest, clone everything, link the root

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::commands::parse_category;
use crate::config;
use crate::fleet::{CloneOutcome, Fleet};
use crate::pool::TaskPool;
use crate::registry::{Registry, RepoRecord};

const CLONE_PROGRESS_TEMPLATE: &str = "{prefix:.bold} [{bar:30}] {pos}/{len}";
const CLONE_PROGRESS_CHARS: &str = "##-";

/// Handles `fleet init`
pub async fn handle_init(
    root: PathBuf,
    manifest: Option<PathBuf>,
    category: Option<String>,
    parallel: usize,
    local: bool,
) -> Result<()> {
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Unable to create fleet root {}", root.display()))?;

    let mut registry = Registry::load_or_default(&root)?;
    if let Some(manifest) = manifest {
        let data = std::fs::read_to_string(&manifest)
            .with_context(|| format!("Unable to read manifest {}", manifest.display()))?;
        let records: Vec<RepoRecord> = serde_json::from_str(&data)
            .with_context(|| format!("Manifest {} is not valid JSON", manifest.display()))?;
        registry.merge(records);
    }

    // A category-scoped init tracks only that category
    if let Some(category) = parse_category(category.as_deref())? {
        registry.repos.retain(|r| r.category == category);
    }

    println!("🚀 Initializing fleet in {}", root.display());
    let fleet = Fleet::new(&root, &registry);
    let progress = clone_progress_bar(registry.repos.len() as u64)?;

    let mut pool = TaskPool::new(parallel);
    for repo in registry.repos.clone() {
        let fleet = fleet.clone();
        let progress = progress.clone();
        pool.submit(async move {
            match fleet.clone_repo(&repo).await {
                Ok(CloneOutcome::Cloned) => progress.println(format!("🟢 cloned {}", repo.url)),
                Ok(CloneOutcome::AlreadyExists) => {
                    progress.println(format!("🟠 exists {}", repo.url));
                }
                Err(e) => progress.println(format!("🔴 {e}")),
            }
            progress.inc(1);
        })
        .await;
    }
    pool.wait().await;
    progress.finish_and_clear();

    if !local {
        config::link_root(&root)?;
    }
    registry.save(&root)?;

    let total = registry.repos.len();
    let repo_word = if total == 1 { "repository" } else { "repositories" };
    println!("✅ {total} {repo_word} tracked");
    Ok(())
}

fn clone_progress_bar(len: u64) -> Result<ProgressBar> {
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::default_bar()
            .template(CLONE_PROGRESS_TEMPLATE)?
            .progress_chars(CLONE_PROGRESS_CHARS),
    );
    progress.set_prefix("cloning");
    Ok(progress)
}
