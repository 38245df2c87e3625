//! Run a shell command in every selected repository

use anyhow::Result;
use std::path::PathBuf;

use crate::commands::select_repos;
use crate::fleet::Fleet;
use crate::registry::Registry;

/// Handles `fleet exec <command...>`
pub async fn handle_exec(
    root: PathBuf,
    command: Vec<String>,
    shell: Option<String>,
    category: Option<String>,
    repo_filter: Option<String>,
    parallel: usize,
) -> Result<()> {
    let registry = Registry::load(&root)?;
    let repos = select_repos(&registry, category.as_deref(), repo_filter.as_deref())?;
    let shell = shell
        .or_else(|| std::env::var("SHELL").ok().filter(|s| !s.is_empty()))
        .unwrap_or_else(|| "sh".to_string());
    let command_line = command.join(" ");

    let fleet = Fleet::new(&root, &registry);
    fleet.exec_each(repos, &shell, &command_line, parallel).await;
    Ok(())
}
