//! Solution manifest (`.sln`) parsing.
//!
//! The format is line oriented. A small ordered table of sections is matched
//! against each line: single-line sections are handled immediately, multi-line
//! sections collect lines until their end pattern and are handled as a block.
//! Lines that start no known section are ignored.

use crate::error::{ParseError, require};
use regex::Regex;
use slnmeta_core::model::{ProjectStub, SolutionRecord};
use std::sync::OnceLock;

type SectionHandler = fn(&mut SolutionRecord, &Regex, &[&str]);

struct Section {
    start: Regex,
    end: Option<Regex>,
    handler: SectionHandler,
}

fn sections() -> &'static [Section] {
    static SECTIONS: OnceLock<Vec<Section>> = OnceLock::new();
    SECTIONS.get_or_init(|| {
        vec![
            Section {
                start: Regex::new(
                    r"^Microsoft Visual Studio Solution File(?:,\s*Format Version\s+(\S+))?",
                )
                .unwrap(),
                end: None,
                handler: |record, start, block| {
                    record.format_version = first_capture(start, block);
                },
            },
            Section {
                start: Regex::new(r"^VisualStudioVersion\s*=\s*(\S+)").unwrap(),
                end: None,
                handler: |record, start, block| {
                    record.tool_version = first_capture(start, block);
                },
            },
            Section {
                start: Regex::new(r"^MinimumVisualStudioVersion\s*=\s*(\S+)").unwrap(),
                end: None,
                handler: |record, start, block| {
                    record.minimum_tool_version = first_capture(start, block);
                },
            },
            Section {
                start: Regex::new(r"^Project\(").unwrap(),
                end: Some(Regex::new(r"^EndProject\s*$").unwrap()),
                handler: |record, _, block| {
                    if let Some(stub) = parse_project_block(block) {
                        record.projects.push(stub);
                    }
                },
            },
        ]
    })
}

fn first_capture(start: &Regex, block: &[&str]) -> Option<String> {
    let line = block.first()?;
    start
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse one `Project(...) ... EndProject` block into a stub.
fn parse_project_block(block: &[&str]) -> Option<ProjectStub> {
    static PROJECT_RE: OnceLock<Regex> = OnceLock::new();
    let project_re = PROJECT_RE.get_or_init(|| {
        Regex::new(
            r#"^Project\("\{(?P<type>[^}]*)\}"\)\s*=\s*"(?P<name>[^"]*)"\s*,\s*"(?P<path>[^"]*)"\s*,\s*"\{(?P<id>[^}]*)\}""#,
        )
        .unwrap()
    });

    let caps = project_re.captures(block.first()?)?;
    Some(ProjectStub {
        type_ids: vec![caps["type"].to_string()],
        name: caps["name"].to_string(),
        path: caps["path"].to_string(),
        id: caps["id"].to_string(),
    })
}

/// Parse the full text of a solution manifest.
///
/// Unknown or malformed sections are skipped; only blank input is an error.
pub fn parse_solution(content: &str) -> Result<SolutionRecord, ParseError> {
    require(content, "solution content")?;

    let sections = sections();
    let mut record = SolutionRecord::default();
    let mut open: Option<(&Section, Vec<&str>)> = None;

    for raw in content.trim_start_matches('\u{feff}').lines() {
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        if let Some((section, mut block)) = open.take() {
            block.push(line);
            if section.end.as_ref().is_some_and(|end| end.is_match(line)) {
                (section.handler)(&mut record, &section.start, &block);
            } else {
                open = Some((section, block));
            }
            continue;
        }

        let Some(section) = sections.iter().find(|s| s.start.is_match(line)) else {
            continue;
        };
        if section.end.is_some() {
            open = Some((section, vec![line]));
        } else {
            (section.handler)(&mut record, &section.start, &[line]);
        }
    }

    // Unterminated trailing block.
    if let Some((section, block)) = open {
        (section.handler)(&mut record, &section.start, &block);
    }

    tracing::debug!(
        projects = record.projects.len(),
        format_version = ?record.format_version,
        "parsed solution manifest"
    );
    Ok(record)
}
