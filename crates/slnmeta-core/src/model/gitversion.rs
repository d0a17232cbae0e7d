//! Semantic-versioning policy read from a `GitVersion.yml` next to a solution.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

keyword_enum!(
    /// How pre-release versions are produced.
    VersioningMode {
        ContinuousDelivery,
        ContinuousDeployment,
        Mainline,
    }
);

keyword_enum!(
    /// Which version components are stamped into assembly versions.
    AssemblyVersioningScheme {
        MajorMinorPatchTag,
        MajorMinorPatch,
        MajorMinor,
        Major,
        None,
    }
);

keyword_enum!(
    /// Which version component a new commit bumps.
    IncrementStrategy {
        None,
        Major,
        Minor,
        Patch,
        Inherit,
    }
);

keyword_enum!(
    /// Whether commit messages may bump the version.
    CommitMessageIncrementMode {
        Enabled,
        Disabled,
        MergeMessageOnly,
    }
);

/// Version-increment policy. Fields absent from the file stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitVersionConfig {
    pub mode: Option<VersioningMode>,
    pub next_version: Option<String>,
    pub increment: Option<IncrementStrategy>,
    pub assembly_versioning_scheme: Option<AssemblyVersioningScheme>,
    pub assembly_file_versioning_scheme: Option<AssemblyVersioningScheme>,
    pub assembly_informational_format: Option<String>,
    pub assembly_versioning_format: Option<String>,
    pub assembly_file_versioning_format: Option<String>,
    pub tag_prefix: Option<String>,
    pub continuous_delivery_fallback_tag: Option<String>,
    pub major_version_bump_message: Option<String>,
    pub minor_version_bump_message: Option<String>,
    pub patch_version_bump_message: Option<String>,
    pub no_bump_message: Option<String>,
    pub legacy_semver_padding: Option<i32>,
    pub build_metadata_padding: Option<i32>,
    pub commits_since_version_source_padding: Option<i32>,
    pub tag_pre_release_weight: Option<i32>,
    pub commit_message_incrementing: Option<CommitMessageIncrementMode>,
    pub update_build_number: Option<bool>,
    pub commit_date_format: Option<String>,
    /// Commits excluded from version calculation.
    pub ignore_shas: Vec<String>,
    /// Commits older than this are ignored.
    pub commits_before: Option<NaiveDateTime>,
}
