//! Source access: enumerate items under a locator and fetch their text.

pub mod fs;
pub mod git;
pub mod memory;

pub use fs::FileSystemSource;
pub use git::GitSource;
pub use memory::MemorySource;

use crate::error::SourceError;
use slnmeta_core::config::SourcesConfig;
use slnmeta_core::locator::{SourceKind, SourceLocator};

/// A provider-specific item as returned by [`SourceAccess::enumerate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub path: String,
    pub is_directory: bool,
}

impl RawItem {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_directory: false,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
        }
    }
}

/// Read access to one store of artifacts. Shared by every scan worker.
pub trait SourceAccess: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// List every item at or under `root`.
    fn enumerate(&self, root: &SourceLocator) -> Result<Vec<RawItem>, SourceError>;

    /// Text content of one item, `None` when it does not exist.
    fn fetch_content(&self, locator: &SourceLocator) -> Result<Option<String>, SourceError>;

    /// Project a raw item into a locator of this source's kind.
    fn map(
        &self,
        item: &RawItem,
        repository: Option<&str>,
        branch: Option<&str>,
    ) -> Result<SourceLocator, SourceError> {
        Ok(SourceLocator::new(
            self.kind(),
            item.path.clone(),
            item.is_directory,
            repository.map(str::to_string),
            branch.map(str::to_string),
        )?)
    }
}

/// Open the bundled provider for `root`'s kind.
///
/// Git roots resolve their repository name under `sources.git_root` (or the
/// current directory). Centralized version control has no bundled transport.
pub fn open_source(
    root: &SourceLocator,
    sources: &SourcesConfig,
) -> Result<Box<dyn SourceAccess>, SourceError> {
    match root.kind() {
        SourceKind::FileSystem => Ok(Box::new(FileSystemSource::new())),
        SourceKind::GitRepository => {
            let repository = root
                .repository()
                .ok_or_else(|| SourceError::Unsupported("git root without repository".into()))?;
            let branch = root.branch().unwrap_or("main");
            let base = sources.git_root.clone().unwrap_or_default();
            Ok(Box::new(GitSource::open(base.join(repository), branch)?))
        }
        SourceKind::VersionControl => Err(SourceError::Unsupported(
            "no transport is bundled for centralized version control".into(),
        )),
        SourceKind::None => Err(SourceError::Unsupported("empty root locator".into())),
    }
}

/// Decode fetched bytes as text, dropping a leading byte-order mark.
///
/// A UTF-16 byte-order mark selects UTF-16 in that byte order; anything else
/// is read as UTF-8.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => {
            let text = String::from_utf8_lossy(bytes);
            text.strip_prefix('\u{feff}').unwrap_or(&text).to_string()
        }
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
