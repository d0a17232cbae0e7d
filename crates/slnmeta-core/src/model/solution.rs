//! Solution-level records.

use super::gitversion::GitVersionConfig;
use super::project::{ProjectMetadata, ProjectStub};
use super::{overlay, overlay_some};
use crate::locator::SourceLocator;
use serde::{Deserialize, Serialize};

/// The contents of one solution manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionRecord {
    pub format_version: Option<String>,
    pub minimum_tool_version: Option<String>,
    pub tool_version: Option<String>,
    /// Project entries in manifest order.
    pub projects: Vec<ProjectStub>,
    pub git_version: Option<GitVersionConfig>,
}

/// A solution with every project it references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionMetadata {
    pub name: String,
    pub locator: Option<SourceLocator>,
    pub format_version: Option<String>,
    pub minimum_tool_version: Option<String>,
    pub tool_version: Option<String>,
    pub project_stubs: Vec<ProjectStub>,
    pub projects: Vec<ProjectMetadata>,
    pub git_version: Option<GitVersionConfig>,
}

impl SolutionMetadata {
    pub fn new(name: impl Into<String>, locator: Option<SourceLocator>) -> Self {
        Self {
            name: name.into(),
            locator,
            ..Self::default()
        }
    }

    /// Overlay the fields of a parsed solution manifest.
    pub fn update_from_solution(&mut self, record: SolutionRecord) {
        overlay(&mut self.format_version, record.format_version);
        overlay(&mut self.minimum_tool_version, record.minimum_tool_version);
        overlay(&mut self.tool_version, record.tool_version);
        overlay(&mut self.project_stubs, record.projects);
        overlay_some(&mut self.git_version, record.git_version);
    }

    /// Overlay another solution record. Projects are appended, not matched by identity.
    pub fn update(&mut self, other: SolutionMetadata) {
        overlay(&mut self.name, other.name);
        overlay_some(&mut self.locator, other.locator);
        overlay(&mut self.format_version, other.format_version);
        overlay(&mut self.minimum_tool_version, other.minimum_tool_version);
        overlay(&mut self.tool_version, other.tool_version);
        overlay(&mut self.project_stubs, other.project_stubs);
        self.projects.extend(other.projects);
        overlay_some(&mut self.git_version, other.git_version);
    }

    pub fn setting_count(&self) -> usize {
        self.projects.iter().map(ProjectMetadata::setting_count).sum()
    }
}
