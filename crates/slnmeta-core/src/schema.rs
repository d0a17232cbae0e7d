//! Inventory document and its JSON schema version handling.

use crate::locator::SourceLocator;
use crate::model::SolutionMetadata;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: &str = "1.0.0";

/// The persisted result of one scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub root: SourceLocator,
    pub solutions: Vec<SolutionMetadata>,
}

impl Inventory {
    pub fn new(root: SourceLocator, solutions: Vec<SolutionMetadata>) -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            generated_at: Utc::now(),
            root,
            solutions,
        }
    }

    pub fn project_count(&self) -> usize {
        self.solutions.iter().map(|s| s.projects.len()).sum()
    }

    pub fn setting_count(&self) -> usize {
        self.solutions.iter().map(SolutionMetadata::setting_count).sum()
    }
}

/// Validate an inventory's schema version.
pub fn validate_version(inventory: &Inventory) -> Result<()> {
    if inventory.version != CURRENT_VERSION {
        anyhow::bail!(
            "inventory version mismatch: expected {}, found {}",
            CURRENT_VERSION,
            inventory.version
        );
    }
    Ok(())
}

/// Serialize an inventory to a pretty-printed JSON string.
pub fn to_json(inventory: &Inventory) -> Result<String> {
    serde_json::to_string_pretty(inventory).context("failed to serialize inventory to JSON")
}

/// Deserialize an inventory from a JSON string.
pub fn from_json(json: &str) -> Result<Inventory> {
    let inventory: Inventory =
        serde_json::from_str(json).context("failed to deserialize inventory from JSON")?;
    validate_version(&inventory)?;
    Ok(inventory)
}
