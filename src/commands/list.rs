//! List tracked checkout paths

use anyhow::Result;
use std::path::PathBuf;

use crate::commands::parse_category;
use crate::registry::Registry;

/// Handles `fleet list`
pub fn handle_list(root: PathBuf, category: Option<String>) -> Result<()> {
    let registry = Registry::load(&root)?;
    let category = parse_category(category.as_deref())?;
    for repo in registry.select(category, None) {
        println!("{}", repo.local_path(&root).display());
    }
    Ok(())
}
