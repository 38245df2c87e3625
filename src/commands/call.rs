//! Invoke the external plugin runner in every selected repository

use anyhow::Result;
use std::path::PathBuf;

use crate::commands::select_repos;
use crate::fleet::Fleet;
use crate::registry::Registry;

/// Environment variable naming the plugin-runner executable
pub const RUNNER_ENV: &str = "FLEET_RUNNER";

/// Handles `fleet call <plugin> <function>`
#[allow(clippy::too_many_arguments)]
pub async fn handle_call(
    root: PathBuf,
    plugin: String,
    function: String,
    runner: Option<String>,
    timeout_ms: Option<u64>,
    category: Option<String>,
    repo_filter: Option<String>,
    parallel: usize,
) -> Result<()> {
    let registry = Registry::load(&root)?;
    let repos = select_repos(&registry, category.as_deref(), repo_filter.as_deref())?;
    let runner = runner
        .or_else(|| std::env::var(RUNNER_ENV).ok().filter(|s| !s.is_empty()))
        .ok_or_else(|| {
            anyhow::anyhow!("No plugin runner configured: pass --runner or set {RUNNER_ENV}")
        })?;

    let fleet = Fleet::new(&root, &registry);
    fleet
        .call_each(repos, &runner, &plugin, &function, timeout_ms, parallel)
        .await;
    Ok(())
}
