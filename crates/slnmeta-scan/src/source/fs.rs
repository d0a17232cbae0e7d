//! Local filesystem provider.

use super::{RawItem, SourceAccess, decode_text};
use crate::error::SourceError;
use slnmeta_core::locator::{SourceKind, SourceLocator};
use std::io::ErrorKind;
use std::path::Path;

/// Custom ignore file honoured alongside `.gitignore`.
pub const IGNORE_FILE_NAME: &str = ".slnmetaignore";

/// Reads a directory tree from disk. Hidden entries are skipped and
/// `.gitignore` / `.slnmetaignore` rules apply.
#[derive(Debug, Clone, Default)]
pub struct FileSystemSource;

impl FileSystemSource {
    pub fn new() -> Self {
        Self
    }
}

impl SourceAccess for FileSystemSource {
    fn kind(&self) -> SourceKind {
        SourceKind::FileSystem
    }

    fn enumerate(&self, root: &SourceLocator) -> Result<Vec<RawItem>, SourceError> {
        let root_path = Path::new(root.path());
        if !root_path.exists() {
            return Err(SourceError::NotFound(root.path().to_string()));
        }

        let walker = ignore::WalkBuilder::new(root_path)
            .hidden(true)
            .git_ignore(true)
            .add_custom_ignore_filename(IGNORE_FILE_NAME)
            .build();

        let items: Vec<RawItem> = walker
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(root = root.path(), error = %err, "skipped unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.depth() > 0)
            .map(|entry| RawItem {
                path: entry.path().to_string_lossy().into_owned(),
                is_directory: entry.file_type().is_some_and(|t| t.is_dir()),
            })
            .collect();

        tracing::debug!(root = root.path(), items = items.len(), "enumerated directory");
        Ok(items)
    }

    fn fetch_content(&self, locator: &SourceLocator) -> Result<Option<String>, SourceError> {
        match std::fs::read(locator.path()) {
            Ok(bytes) => Ok(Some(decode_text(&bytes))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SourceError::Io {
                path: locator.path().to_string(),
                source: err,
            }),
        }
    }
}
