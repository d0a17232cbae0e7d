//! `AssemblyInfo` attribute file parsing.

use crate::error::{ParseError, require};
use regex::Regex;
use std::sync::OnceLock;

/// Parse `[assembly: Name("value")]` declarations, one per line.
///
/// Lines that do not match (comments, usings, non-string attributes,
/// attributes spanning several lines) are skipped.
pub fn parse_assembly_info(content: &str) -> Result<Vec<(String, String)>, ParseError> {
    static ATTRIBUTE_RE: OnceLock<Regex> = OnceLock::new();
    let attribute_re = ATTRIBUTE_RE.get_or_init(|| {
        Regex::new(r#"^\s*[\[<]\s*[Aa]ssembly\s*:\s*(\w+)\s*\(\s*"(.*)"\s*\)\s*[\]>]"#).unwrap()
    });

    require(content, "assembly info content")?;

    Ok(content
        .lines()
        .filter_map(|line| attribute_re.captures(line))
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect())
}
