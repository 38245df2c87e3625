//! Fleet command execution
//!
//! Dispatches one external process per selected repository through the
//! [`TaskPool`](crate::pool::TaskPool): a shell command, a `git clone`, or a
//! plugin-runner invocation. The process runs with the repository's derived
//! checkout as working directory and a repository-derived environment. All
//! hard logic lives in the collaborators; this module only wires them
//! together and reports per-repository failures without stopping the run.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::pool::TaskPool;
use crate::registry::{Registry, RepoRecord};

// Environment injected into every spawned process
pub const ENV_ROOT: &str = "FLEET_ROOT";
pub const ENV_RUNTIME: &str = "FLEET_RUNTIME";
pub const ENV_REPO_URL: &str = "FLEET_REPO_URL";
pub const ENV_REPO_CATEGORY: &str = "FLEET_REPO_CATEGORY";

/// Outcome of a clone request for one repository
#[derive(Debug, PartialEq, Eq)]
pub enum CloneOutcome {
    Cloned,
    AlreadyExists,
}

/// Per-run context shared by every dispatched task
#[derive(Clone)]
pub struct Fleet {
    root: PathBuf,
    runtime: Option<PathBuf>,
}

impl Fleet {
    pub fn new(root: impl Into<PathBuf>, registry: &Registry) -> Self {
        let root = root.into();
        let runtime = registry.runtime_path(&root);
        Self { root, runtime }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Applies working directory and the repository environment to a command
    fn prepare(&self, command: &mut Command, repo: &RepoRecord) {
        command
            .current_dir(repo.local_path(&self.root))
            .env(ENV_ROOT, &self.root)
            .env(ENV_REPO_URL, &repo.url)
            .env(ENV_REPO_CATEGORY, repo.category.text());
        if let Some(runtime) = &self.runtime {
            command.env(ENV_RUNTIME, runtime);
        }
    }

    /// Runs `shell -c command` in every repository, `parallel` at a time.
    /// Each repository reports its own failure; the iteration never stops.
    pub async fn exec_each(
        &self,
        repos: Vec<RepoRecord>,
        shell: &str,
        command_line: &str,
        parallel: usize,
    ) {
        let mut pool = TaskPool::new(parallel);
        for repo in repos {
            let fleet = self.clone();
            let shell = shell.to_string();
            let command_line = command_line.to_string();
            pool.submit(async move {
                let mut command = Command::new(&shell);
                command.arg("-c").arg(&command_line);
                fleet.prepare(&mut command, &repo);
                report(&repo, run(command, None).await);
            })
            .await;
        }
        pool.wait().await;
    }

    /// Invokes the external plugin runner once per repository. The runner is
    /// a black box: `runner <plugin> <function>` with the repository URL in
    /// the environment. `timeout` bounds only the runner process itself.
    pub async fn call_each(
        &self,
        repos: Vec<RepoRecord>,
        runner: &str,
        plugin: &str,
        function: &str,
        timeout_ms: Option<u64>,
        parallel: usize,
    ) {
        let mut pool = TaskPool::new(parallel);
        for repo in repos {
            let fleet = self.clone();
            let runner = runner.to_string();
            let plugin = plugin.to_string();
            let function = function.to_string();
            pool.submit(async move {
                let path = repo.local_path(&fleet.root);
                tracing::debug!("running plugin {plugin} in {}", path.display());
                let mut command = Command::new(&runner);
                command.arg(&plugin).arg(&function);
                fleet.prepare(&mut command, &repo);
                let timeout = timeout_ms.map(Duration::from_millis);
                report(&repo, run(command, timeout).await);
            })
            .await;
        }
        pool.wait().await;
    }

    /// Clones one repository to its derived path. An existing checkout is
    /// left alone and reported as [`CloneOutcome::AlreadyExists`].
    pub async fn clone_repo(&self, repo: &RepoRecord) -> Result<CloneOutcome> {
        let (owner, _) = repo.owner_and_name();
        let full = repo.local_path(&self.root);
        if full.exists() {
            return Ok(CloneOutcome::AlreadyExists);
        }
        std::fs::create_dir_all(self.root.join(owner))?;

        tracing::debug!("running git clone {} {}", repo.url, full.display());
        let mut command = Command::new("git");
        command.arg("clone").arg(&repo.url).arg(&full);
        let (success, _, stderr) = run(command, None).await?;
        if !success {
            return Err(anyhow!("git clone {} failed: {stderr}", repo.url));
        }
        Ok(CloneOutcome::Cloned)
    }
}

/// Runs one external process to completion, optionally bounded by a timeout.
/// Returns (success, stdout, stderr).
async fn run(mut command: Command, timeout: Option<Duration>) -> Result<(bool, String, String)> {
    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, command.output())
            .await
            .map_err(|_| anyhow!("Process timed out after {} ms", limit.as_millis()))??,
        None => command.output().await?,
    };
    Ok((
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).trim().to_string(),
        String::from_utf8_lossy(&output.stderr).trim().to_string(),
    ))
}

/// Prints one repository's result. Output is assembled into a single string
/// first so concurrent tasks interleave whole blocks, not lines.
fn report(repo: &RepoRecord, result: Result<(bool, String, String)>) {
    match result {
        Ok((success, stdout, stderr)) => {
            let mut block = format!("── {}\n", repo.url);
            if !stdout.is_empty() {
                block.push_str(&stdout);
                block.push('\n');
            }
            if !success {
                block.push_str(&format!("🔴 failed: {stderr}\n"));
            }
            print!("{block}");
        }
        Err(e) => eprintln!("🔴 {}: {e}", repo.url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Category;
    use std::fs;
    use tempfile::TempDir;

    fn fake_repo(root: &Path, url: &str, category: Category) -> RepoRecord {
        let repo = RepoRecord::new(url, category);
        fs::create_dir_all(repo.local_path(root)).unwrap();
        repo
    }

    #[tokio::test]
    async fn test_exec_runs_in_every_repo_with_env() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mut registry = Registry::default();
        let a = fake_repo(root, "https://github.com/acme/one", Category::Sdk);
        let b = fake_repo(root, "https://github.com/acme/two", Category::Pdk);
        registry.merge(vec![a.clone(), b.clone()]);

        let fleet = Fleet::new(root, &registry);
        fleet
            .exec_each(
                registry.select(None, None),
                "sh",
                "printf '%s %s' \"$FLEET_REPO_URL\" \"$FLEET_REPO_CATEGORY\" > marker",
                2,
            )
            .await;

        let one = fs::read_to_string(a.local_path(root).join("marker")).unwrap();
        assert_eq!(one, "https://github.com/acme/one sdk");
        let two = fs::read_to_string(b.local_path(root).join("marker")).unwrap();
        assert_eq!(two, "https://github.com/acme/two pdk");
    }

    #[tokio::test]
    async fn test_exec_exports_runtime_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mut registry = Registry::default();
        let core = fake_repo(root, "https://github.com/acme/core", Category::Runtime);
        let sdk = fake_repo(root, "https://github.com/acme/js-sdk", Category::Sdk);
        registry.merge(vec![core.clone(), sdk.clone()]);

        let fleet = Fleet::new(root, &registry);
        fleet
            .exec_each(
                registry.select(Some(Category::Sdk), None),
                "sh",
                "printf '%s' \"$FLEET_RUNTIME\" > runtime",
                1,
            )
            .await;

        let recorded = fs::read_to_string(sdk.local_path(root).join("runtime")).unwrap();
        assert_eq!(recorded, core.local_path(root).to_string_lossy());
        assert!(!core.local_path(root).join("runtime").exists());
    }

    #[tokio::test]
    async fn test_failing_repo_does_not_stop_the_fleet() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let mut registry = Registry::default();
        let bad = fake_repo(root, "https://github.com/acme/bad", Category::Other);
        let good = fake_repo(root, "https://github.com/acme/good", Category::Other);
        registry.merge(vec![bad.clone(), good.clone()]);

        let fleet = Fleet::new(root, &registry);
        fleet
            .exec_each(
                registry.select(None, None),
                "sh",
                "test \"$FLEET_REPO_URL\" != https://github.com/acme/bad && touch marker",
                1,
            )
            .await;

        assert!(!bad.local_path(root).join("marker").exists());
        assert!(good.local_path(root).join("marker").exists());
    }

    #[tokio::test]
    async fn test_clone_skips_existing_checkout() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let registry = Registry::default();
        let fleet = Fleet::new(root, &registry);
        let repo = fake_repo(root, "https://github.com/acme/present", Category::Other);

        let outcome = fleet.clone_repo(&repo).await.unwrap();
        assert_eq!(outcome, CloneOutcome::AlreadyExists);
    }
}
