//! Local Git repository provider: reads one branch's tree.

use super::{RawItem, SourceAccess, decode_text};
use crate::error::SourceError;
use git2::{BranchType, ErrorCode, ObjectType, Repository, Tree, TreeWalkMode, TreeWalkResult};
use slnmeta_core::locator::{SourceKind, SourceLocator};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Serves the committed tree of one branch. Paths are `/`-rooted
/// (`/src/App/App.csproj`); the working directory is never read.
pub struct GitSource {
    repo: Mutex<Repository>,
    path: PathBuf,
    branch: String,
}

impl std::fmt::Debug for GitSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitSource")
            .field("path", &self.path)
            .field("branch", &self.branch)
            .finish_non_exhaustive()
    }
}

impl GitSource {
    pub fn open(path: impl Into<PathBuf>, branch: impl Into<String>) -> Result<Self, SourceError> {
        let path = path.into();
        let repo = Repository::open(&path)?;
        Ok(Self {
            repo: Mutex::new(repo),
            path,
            branch: branch.into(),
        })
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The branch tip's tree. Local branches win over `origin/<branch>`.
    fn branch_tree<'r>(&self, repo: &'r Repository) -> Result<Tree<'r>, SourceError> {
        let branch = match repo.find_branch(&self.branch, BranchType::Local) {
            Ok(branch) => branch,
            Err(err) if err.code() == ErrorCode::NotFound => repo
                .find_branch(&format!("origin/{}", self.branch), BranchType::Remote)
                .map_err(|_| SourceError::NotFound(format!("branch '{}'", self.branch)))?,
            Err(err) => return Err(err.into()),
        };
        Ok(branch.get().peel_to_tree()?)
    }
}

fn repo_path(locator: &SourceLocator) -> &str {
    locator.path().trim_start_matches('/')
}

impl SourceAccess for GitSource {
    fn kind(&self) -> SourceKind {
        SourceKind::GitRepository
    }

    fn enumerate(&self, root: &SourceLocator) -> Result<Vec<RawItem>, SourceError> {
        let repo = self.repo.lock().unwrap_or_else(PoisonError::into_inner);
        let tree = self.branch_tree(&repo)?;

        let prefix = repo_path(root).trim_end_matches('/').to_string();
        let start = if prefix.is_empty() {
            tree
        } else {
            let entry = match tree.get_path(Path::new(&prefix)) {
                Ok(entry) => entry,
                Err(err) if err.code() == ErrorCode::NotFound => {
                    return Err(SourceError::NotFound(root.to_string()));
                }
                Err(err) => return Err(err.into()),
            };
            entry.to_object(&repo)?.peel_to_tree()?
        };

        let base = if prefix.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", prefix)
        };
        let mut items = Vec::new();
        start.walk(TreeWalkMode::PreOrder, |dir, entry| {
            if let Some(name) = entry.name() {
                let path = format!("{}{}{}", base, dir, name);
                items.push(RawItem {
                    path,
                    is_directory: entry.kind() == Some(ObjectType::Tree),
                });
            }
            TreeWalkResult::Ok
        })?;

        tracing::debug!(
            repository = %self.path.display(),
            branch = %self.branch,
            items = items.len(),
            "enumerated branch tree"
        );
        Ok(items)
    }

    fn fetch_content(&self, locator: &SourceLocator) -> Result<Option<String>, SourceError> {
        let repo = self.repo.lock().unwrap_or_else(PoisonError::into_inner);
        let tree = self.branch_tree(&repo)?;

        let entry = match tree.get_path(Path::new(repo_path(locator))) {
            Ok(entry) => entry,
            Err(err) if err.code() == ErrorCode::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }
        let blob = entry.to_object(&repo)?.peel_to_blob()?;
        Ok(Some(decode_text(blob.content())))
    }
}
