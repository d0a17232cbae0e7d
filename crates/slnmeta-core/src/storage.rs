//! Read/write inventory files from disk.

use crate::schema::{self, Inventory};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const INVENTORY_DIR: &str = ".slnmeta";
const INVENTORY_FILE: &str = "inventory.json";

/// Default inventory location for a scan root.
pub fn default_inventory_file(root: &Path) -> PathBuf {
    root.join(INVENTORY_DIR).join(INVENTORY_FILE)
}

/// Load an inventory from disk.
pub fn load(path: &Path) -> Result<Inventory> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read inventory from {}", path.display()))?;
    schema::from_json(&json)
}

/// Save an inventory to disk, creating parent directories if needed.
pub fn save(path: &Path, inventory: &Inventory) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }

    let json = schema::to_json(inventory)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write inventory to {}", path.display()))?;

    Ok(())
}
