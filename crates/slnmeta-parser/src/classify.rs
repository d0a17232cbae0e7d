//! File classification by name.

use crate::gitversion::GITVERSION_FILE_NAMES;
use crate::packages::PACKAGE_MANIFEST_NAME;
use crate::project::is_project_file;

/// The kind of artifact a file name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Solution,
    Project,
    PackageManifest,
    /// `*.config` other than the package manifest.
    XmlConfig,
    /// `appsettings*.json`.
    JsonSettings,
    AssemblyInfo,
    GitVersion,
    Other,
}

impl FileKind {
    pub fn is_config(self) -> bool {
        matches!(self, FileKind::XmlConfig | FileKind::JsonSettings)
    }
}

/// Classify a file by name. Directory components are ignored; matching is case-insensitive.
pub fn classify(path: &str) -> FileKind {
    let name = path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .to_ascii_lowercase();

    if name.ends_with(".sln") {
        FileKind::Solution
    } else if is_project_file(&name) {
        FileKind::Project
    } else if name == PACKAGE_MANIFEST_NAME {
        FileKind::PackageManifest
    } else if name.ends_with(".config") {
        FileKind::XmlConfig
    } else if name.starts_with("appsettings") && name.ends_with(".json") {
        FileKind::JsonSettings
    } else if name == "assemblyinfo.cs" || name == "assemblyinfo.vb" {
        FileKind::AssemblyInfo
    } else if GITVERSION_FILE_NAMES.contains(&name.as_str()) {
        FileKind::GitVersion
    } else {
        FileKind::Other
    }
}
