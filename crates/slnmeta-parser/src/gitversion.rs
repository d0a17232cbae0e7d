//! `GitVersion.yml` parsing.
//!
//! The file is YAML-like but only top-level `key: value` lines are read, each
//! with its own line search, so branch-specific overrides nested under
//! `branches:` never leak into the solution-wide policy.

use crate::error::{ParseError, require};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use slnmeta_core::model::GitVersionConfig;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

/// File names recognised as semantic-versioning configuration.
pub const GITVERSION_FILE_NAMES: [&str; 3] =
    ["gitversion.yml", "gitversion.yaml", "gitversionconfig.yaml"];

const KEYS: [&str; 21] = [
    "mode",
    "next-version",
    "increment",
    "assembly-versioning-scheme",
    "assembly-file-versioning-scheme",
    "assembly-informational-format",
    "assembly-versioning-format",
    "assembly-file-versioning-format",
    "tag-prefix",
    "continuous-delivery-fallback-tag",
    "major-version-bump-message",
    "minor-version-bump-message",
    "patch-version-bump-message",
    "no-bump-message",
    "legacy-semver-padding",
    "build-metadata-padding",
    "commits-since-version-source-padding",
    "tag-pre-release-weight",
    "commit-message-incrementing",
    "update-build-number",
    "commit-date-format",
];

fn key_patterns() -> &'static HashMap<&'static str, Regex> {
    static PATTERNS: OnceLock<HashMap<&'static str, Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        KEYS.iter()
            .map(|key| {
                let re = Regex::new(&format!(r"(?m)^{}:(.+)$", regex::escape(key))).unwrap();
                (*key, re)
            })
            .collect()
    })
}

/// Parse a semantic-versioning config. Keys that are absent stay unset.
pub fn parse_gitversion(content: &str) -> Result<GitVersionConfig, ParseError> {
    require(content, "gitversion content")?;

    let config = GitVersionConfig {
        mode: keyword(content, "mode")?,
        next_version: text(content, "next-version"),
        increment: keyword(content, "increment")?,
        assembly_versioning_scheme: keyword(content, "assembly-versioning-scheme")?,
        assembly_file_versioning_scheme: keyword(content, "assembly-file-versioning-scheme")?,
        assembly_informational_format: text(content, "assembly-informational-format"),
        assembly_versioning_format: text(content, "assembly-versioning-format"),
        assembly_file_versioning_format: text(content, "assembly-file-versioning-format"),
        tag_prefix: text(content, "tag-prefix"),
        continuous_delivery_fallback_tag: text(content, "continuous-delivery-fallback-tag"),
        major_version_bump_message: text(content, "major-version-bump-message"),
        minor_version_bump_message: text(content, "minor-version-bump-message"),
        patch_version_bump_message: text(content, "patch-version-bump-message"),
        no_bump_message: text(content, "no-bump-message"),
        legacy_semver_padding: number(content, "legacy-semver-padding")?,
        build_metadata_padding: number(content, "build-metadata-padding")?,
        commits_since_version_source_padding: number(
            content,
            "commits-since-version-source-padding",
        )?,
        tag_pre_release_weight: number(content, "tag-pre-release-weight")?,
        commit_message_incrementing: keyword(content, "commit-message-incrementing")?,
        update_build_number: flag(content, "update-build-number")?,
        commit_date_format: text(content, "commit-date-format"),
        ignore_shas: ignored_shas(content),
        commits_before: commits_before(content)?,
    };

    tracing::debug!(
        mode = ?config.mode,
        ignored = config.ignore_shas.len(),
        "parsed gitversion config"
    );
    Ok(config)
}

/// Trim, drop a trailing ` # comment` and surrounding quotes.
fn clean_value(raw: &str) -> Option<String> {
    let mut value = raw.trim();
    if let Some(idx) = value.find(" #") {
        value = value[..idx].trim_end();
    }
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    (!value.is_empty()).then(|| value.to_string())
}

fn text(content: &str, key: &str) -> Option<String> {
    let re = key_patterns().get(key)?;
    let caps = re.captures(content)?;
    clean_value(&caps[1])
}

fn typed<T>(content: &str, key: &str) -> Result<Option<T>, ParseError>
where
    T: FromStr,
{
    match text(content, key) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|_| {
            ParseError::Malformed(format!("invalid value '{}' for '{}'", value, key))
        }),
    }
}

fn keyword<T: FromStr>(content: &str, key: &str) -> Result<Option<T>, ParseError> {
    typed(content, key)
}

fn number(content: &str, key: &str) -> Result<Option<i32>, ParseError> {
    typed(content, key)
}

fn flag(content: &str, key: &str) -> Result<Option<bool>, ParseError> {
    match text(content, key).map(|v| v.to_ascii_lowercase()).as_deref() {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(ParseError::Malformed(format!(
            "invalid value '{}' for '{}'",
            other, key
        ))),
    }
}

fn commits_before(content: &str) -> Result<Option<NaiveDateTime>, ParseError> {
    static CUTOFF_RE: OnceLock<Regex> = OnceLock::new();
    let cutoff_re =
        CUTOFF_RE.get_or_init(|| Regex::new(r"(?m)^\s*commits-before:(.+)$").unwrap());

    let Some(value) = cutoff_re
        .captures(content)
        .and_then(|caps| clean_value(&caps[1]))
    else {
        return Ok(None);
    };

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&value, format) {
            return Ok(Some(parsed));
        }
    }
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Some)
        .ok_or_else(|| ParseError::Malformed(format!("invalid commits-before date '{}'", value)))
}

/// Collect the SHAs listed under `sha:`, as an indented bullet list or an inline `[a, b]` list.
fn ignored_shas(content: &str) -> Vec<String> {
    static SHA_RE: OnceLock<Regex> = OnceLock::new();
    let sha_re = SHA_RE.get_or_init(|| Regex::new(r"^\s*sha:\s*(.*)$").unwrap());

    let mut lines = content.lines();
    let Some(inline) = lines
        .by_ref()
        .find_map(|line| sha_re.captures(line).map(|caps| caps[1].trim().to_string()))
    else {
        return Vec::new();
    };

    if let Some(list) = inline.strip_prefix('[') {
        return list
            .trim_end_matches(']')
            .split(',')
            .filter_map(clean_value)
            .collect();
    }

    let mut shas = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(item) = trimmed.strip_prefix('-') else {
            break;
        };
        if let Some(sha) = clean_value(item) {
            shas.push(sha);
        }
    }
    shas
}
