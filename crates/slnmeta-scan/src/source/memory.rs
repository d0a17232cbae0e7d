//! In-memory provider, usable with any source kind.

use super::{RawItem, SourceAccess};
use crate::error::SourceError;
use slnmeta_core::locator::{SourceKind, SourceLocator};
use std::collections::BTreeMap;

/// A fixed set of files held in memory. Lookups are case-insensitive and
/// accept either separator.
#[derive(Debug, Clone)]
pub struct MemorySource {
    kind: SourceKind,
    /// Lowercased `/`-separated path → (original path, content).
    files: BTreeMap<String, (String, Option<String>)>,
}

fn key(path: &str) -> String {
    path.replace('\\', "/").to_ascii_lowercase()
}

impl MemorySource {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, path: &str, content: impl Into<String>) -> Self {
        self.insert(path, Some(content.into()));
        self
    }

    /// A file that is listed by `enumerate` but has no content to fetch.
    pub fn with_entry(mut self, path: &str) -> Self {
        self.insert(path, None);
        self
    }

    pub fn insert(&mut self, path: &str, content: Option<String>) {
        self.files.insert(key(path), (path.to_string(), content));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl SourceAccess for MemorySource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn enumerate(&self, root: &SourceLocator) -> Result<Vec<RawItem>, SourceError> {
        let mut prefix = key(root.path()).trim_end_matches('/').to_string();
        prefix.push('/');
        Ok(self
            .files
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .map(|(_, (path, _))| RawItem::file(path.clone()))
            .collect())
    }

    fn fetch_content(&self, locator: &SourceLocator) -> Result<Option<String>, SourceError> {
        Ok(self
            .files
            .get(&key(locator.path()))
            .and_then(|(_, content)| content.clone()))
    }
}
