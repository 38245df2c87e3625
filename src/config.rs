//! Fleet root resolution and defaults
//!
//! The fleet root is the directory every tracked checkout lives under.
//! Resolution order: the `--root` flag, the `FLEET_ROOT` environment
//! variable, then the `~/.fleet` link that `init` leaves behind.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the fleet root
pub const ROOT_ENV: &str = "FLEET_ROOT";

/// Name of the home-directory link to the active fleet root
pub const ROOT_LINK: &str = ".fleet";

/// Default number of parallel clone tasks for `init`
pub fn default_clone_parallelism() -> usize {
    num_cpus::get().min(4)
}

fn home_link() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(ROOT_LINK))
}

/// Resolves the fleet root from the flag, the environment, or the home link.
/// Commands other than `init` require a resolvable root.
pub fn resolve_root(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = flag {
        return Ok(root);
    }
    if let Ok(root) = std::env::var(ROOT_ENV) {
        if !root.is_empty() {
            return Ok(PathBuf::from(root));
        }
    }
    if let Some(link) = home_link() {
        tracing::debug!("checking {}", link.display());
        if let Ok(target) = std::fs::read_link(&link) {
            return Ok(target);
        }
    }
    anyhow::bail!(
        "No fleet root configured: pass --root, set {ROOT_ENV}, or run `fleet init --root <dir>`"
    )
}

/// Points `~/.fleet` at `root`, replacing any previous link
#[cfg(unix)]
pub fn link_root(root: &Path) -> Result<()> {
    let link = home_link().context("Unable to determine home directory")?;
    let target = std::fs::canonicalize(root)
        .with_context(|| format!("Unable to resolve {}", root.display()))?;
    let _ = std::fs::remove_file(&link);
    println!("Linking {} to {}", link.display(), target.display());
    std::os::unix::fs::symlink(&target, &link)
        .with_context(|| format!("Unable to create link {}", link.display()))
}

#[cfg(not(unix))]
pub fn link_root(_root: &Path) -> Result<()> {
    eprintln!("⚠️  Global root links are only supported on unix; pass --root or set {ROOT_ENV}");
    Ok(())
}

/// Removes the `~/.fleet` link. Returns the old target when one existed.
pub fn unlink_root() -> Result<Option<PathBuf>> {
    let Some(link) = home_link() else {
        return Ok(None);
    };
    match std::fs::read_link(&link) {
        Ok(target) => {
            std::fs::remove_file(&link)
                .with_context(|| format!("Unable to remove {}", link.display()))?;
            Ok(Some(target))
        }
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        let root = resolve_root(Some(PathBuf::from("/explicit"))).unwrap();
        assert_eq!(root, PathBuf::from("/explicit"));
    }

    #[test]
    fn test_clone_parallelism_is_bounded() {
        let parallel = default_clone_parallelism();
        assert!(parallel >= 1 && parallel <= 4);
    }
}
