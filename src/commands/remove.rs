//! Untrack repositories and delete their checkouts

use anyhow::Result;
use std::path::PathBuf;

use crate::registry::Registry;

/// Handles `fleet remove <url>`. Matches by URL suffix, so `owner/name` or a
/// bare repository name both work. `--keep` leaves checkouts on disk.
pub fn handle_remove(root: PathBuf, url: String, keep: bool) -> Result<()> {
    let mut registry = Registry::load(&root)?;
    let removed = registry.remove(&url);
    if removed.is_empty() {
        println!("No tracked repository matches {url}");
        return Ok(());
    }

    for record in removed {
        let path = record.local_path(&root);
        if keep || !path.exists() {
            println!("Untracked {}", record.url);
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => println!("Removed {}", path.display()),
            Err(e) => {
                // The checkout survives, so keep tracking it
                eprintln!("Error: unable to remove {}: {e}", path.display());
                registry.merge(vec![record]);
            }
        }
    }

    registry.save(&root)?;
    Ok(())
}
