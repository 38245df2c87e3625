//! Remove the files `fleet init` created, leaving the checkouts alone

use anyhow::Result;

use crate::config;
use crate::registry::REGISTRY_FILE;

/// Handles `fleet clean`
pub fn handle_clean() -> Result<()> {
    let Some(target) = config::unlink_root()? else {
        println!("No global fleet link found, skipping");
        return Ok(());
    };
    println!("Removed fleet link to {}", target.display());

    let registry_file = target.join(REGISTRY_FILE);
    if registry_file.exists() {
        match std::fs::remove_file(&registry_file) {
            Ok(()) => println!("Removed {}", registry_file.display()),
            Err(e) => eprintln!("Unable to remove {}: {e}", registry_file.display()),
        }
    }

    println!("Note: repository checkouts under {} are left in place", target.display());
    Ok(())
}
