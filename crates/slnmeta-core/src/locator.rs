//! Generic locators for artifacts held by a filesystem or a version-control repository.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of store a locator points into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    #[default]
    None,
    FileSystem,
    /// A Git repository addressed by repository name and branch.
    GitRepository,
    /// A centralized version-control repository (server paths like `$/Team/Main`).
    VersionControl,
}

impl SourceKind {
    /// Path separator used by locators of this kind.
    pub fn separator(self) -> char {
        match self {
            SourceKind::FileSystem => std::path::MAIN_SEPARATOR,
            _ => '/',
        }
    }
}

/// Identifies one artifact (file or directory) in a source tree.
///
/// Locators are validated on construction and never mutated afterwards; the
/// derivation helpers ([`parent`](Self::parent), [`child`](Self::child),
/// [`sibling`](Self::sibling)) always return new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LocatorParts", into = "LocatorParts")]
pub struct SourceLocator {
    kind: SourceKind,
    path: String,
    is_directory: bool,
    repository: Option<String>,
    branch: Option<String>,
}

/// Unvalidated wire form of a [`SourceLocator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocatorParts {
    kind: SourceKind,
    path: String,
    #[serde(default)]
    is_directory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
}

impl TryFrom<LocatorParts> for SourceLocator {
    type Error = ModelError;

    fn try_from(parts: LocatorParts) -> Result<Self, Self::Error> {
        SourceLocator::new(
            parts.kind,
            parts.path,
            parts.is_directory,
            parts.repository,
            parts.branch,
        )
    }
}

impl From<SourceLocator> for LocatorParts {
    fn from(locator: SourceLocator) -> Self {
        LocatorParts {
            kind: locator.kind,
            path: locator.path,
            is_directory: locator.is_directory,
            repository: locator.repository,
            branch: locator.branch,
        }
    }
}

impl SourceLocator {
    /// Build and validate a locator. Separators in `path` are normalised to the
    /// kind's separator.
    pub fn new(
        kind: SourceKind,
        path: impl Into<String>,
        is_directory: bool,
        repository: Option<String>,
        branch: Option<String>,
    ) -> Result<Self, ModelError> {
        let path = path.into();
        let path = if kind == SourceKind::None {
            path
        } else {
            normalize_separators(&path, kind.separator())
        };
        let locator = SourceLocator {
            kind,
            path,
            is_directory,
            repository: repository.filter(|r| !r.is_empty()),
            branch: branch.filter(|b| !b.is_empty()),
        };
        locator.validate()?;
        Ok(locator)
    }

    /// The empty locator.
    pub fn none() -> Self {
        SourceLocator {
            kind: SourceKind::None,
            path: String::new(),
            is_directory: false,
            repository: None,
            branch: None,
        }
    }

    pub fn file_system(path: impl Into<String>, is_directory: bool) -> Result<Self, ModelError> {
        Self::new(SourceKind::FileSystem, path, is_directory, None, None)
    }

    pub fn git(
        repository: impl Into<String>,
        branch: impl Into<String>,
        path: impl Into<String>,
        is_directory: bool,
    ) -> Result<Self, ModelError> {
        Self::new(
            SourceKind::GitRepository,
            path,
            is_directory,
            Some(repository.into()),
            Some(branch.into()),
        )
    }

    pub fn version_control(path: impl Into<String>, is_directory: bool) -> Result<Self, ModelError> {
        Self::new(SourceKind::VersionControl, path, is_directory, None, None)
    }

    fn validate(&self) -> Result<(), ModelError> {
        match self.kind {
            SourceKind::None => {
                if !self.path.is_empty()
                    || self.is_directory
                    || self.repository.is_some()
                    || self.branch.is_some()
                {
                    return Err(ModelError::InvalidLocator(
                        "a locator of kind None must be empty".to_string(),
                    ));
                }
            }
            SourceKind::GitRepository => {
                if self.repository.is_none() || self.branch.is_none() {
                    return Err(ModelError::InvalidLocator(format!(
                        "git locator '{}' requires a repository and a branch",
                        self.path
                    )));
                }
                if self.path.is_empty() {
                    return Err(ModelError::InvalidLocator("empty path".to_string()));
                }
            }
            SourceKind::FileSystem | SourceKind::VersionControl => {
                if self.repository.is_some() || self.branch.is_some() {
                    return Err(ModelError::InvalidLocator(format!(
                        "{:?} locator '{}' cannot carry a repository or branch",
                        self.kind, self.path
                    )));
                }
                if self.path.is_empty() {
                    return Err(ModelError::InvalidLocator("empty path".to_string()));
                }
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn separator(&self) -> char {
        self.kind.separator()
    }

    /// The path with every separator rewritten to `/`.
    pub fn normalized_path(&self) -> String {
        self.path.replace('\\', "/")
    }

    /// Last path segment (file or directory name).
    pub fn file_name(&self) -> &str {
        let trimmed = self.path.trim_end_matches(self.separator());
        trimmed
            .rsplit(self.separator())
            .next()
            .unwrap_or(trimmed)
    }

    /// File name without its final extension.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }

    /// Case-insensitive suffix test, e.g. `has_extension(".sln")`.
    pub fn has_extension(&self, extension: &str) -> bool {
        self.path
            .to_ascii_lowercase()
            .ends_with(&extension.to_ascii_lowercase())
    }

    /// Whether this locator lies strictly below `directory` in the same store.
    /// Comparison is case-insensitive.
    pub fn is_under(&self, directory: &SourceLocator) -> bool {
        if !self.same_store(directory) {
            return false;
        }
        let sep = self.separator();
        let mut prefix = directory
            .path
            .trim_end_matches(sep)
            .to_ascii_lowercase();
        prefix.push(sep);
        self.path.to_ascii_lowercase().starts_with(&prefix)
    }

    /// Whether both locators address the same repository/branch (or both the filesystem).
    pub fn same_store(&self, other: &SourceLocator) -> bool {
        self.kind == other.kind
            && self.repository == other.repository
            && self.branch == other.branch
    }

    /// The containing directory. A root locator is its own parent.
    pub fn parent(&self) -> SourceLocator {
        let sep = self.separator();
        let trimmed = self.path.trim_end_matches(sep);
        let parent_path = match trimmed.rfind(sep) {
            Some(0) => sep.to_string(),
            Some(idx) => trimmed[..idx].to_string(),
            None if trimmed.is_empty() => self.path.clone(),
            None => trimmed.to_string(),
        };
        SourceLocator {
            kind: self.kind,
            path: parent_path,
            is_directory: true,
            repository: self.repository.clone(),
            branch: self.branch.clone(),
        }
    }

    /// Resolve `relative` (either separator, `.` and `..` allowed) against this locator.
    pub fn child(&self, relative: &str, is_directory: bool) -> Result<SourceLocator, ModelError> {
        if self.kind == SourceKind::None {
            return Err(ModelError::InvalidLocator(
                "cannot derive a child from an empty locator".to_string(),
            ));
        }
        let sep = self.separator();
        let relative = normalize_separators(relative, sep);
        let joined = format!(
            "{}{}{}",
            self.path.trim_end_matches(sep),
            sep,
            relative.trim_start_matches(sep)
        );
        Self::new(
            self.kind,
            normalize_segments(&joined, sep),
            is_directory,
            self.repository.clone(),
            self.branch.clone(),
        )
    }

    /// A file or directory next to this one.
    pub fn sibling(&self, name: &str, is_directory: bool) -> Result<SourceLocator, ModelError> {
        self.parent().child(name, is_directory)
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.repository, &self.branch) {
            (Some(repo), Some(branch)) => write!(f, "{}@{}:{}", repo, branch, self.path),
            _ => f.write_str(&self.path),
        }
    }
}

fn normalize_separators(path: &str, sep: char) -> String {
    let foreign = if sep == '/' { '\\' } else { '/' };
    path.replace(foreign, &sep.to_string())
}

/// Collapse empty, `.` and `..` segments. A leading separator is preserved.
fn normalize_segments(path: &str, sep: char) -> String {
    let rooted = path.starts_with(sep);
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split(sep) {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }
    let joined = parts.join(&sep.to_string());
    if rooted {
        format!("{}{}", sep, joined)
    } else {
        joined
    }
}
