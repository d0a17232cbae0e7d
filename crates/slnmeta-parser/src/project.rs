//! Project manifest (`.csproj`, `.vbproj`, `.fsproj`) parsing.
//!
//! Both manifest dialects are read with the same rules. The dialect is
//! recorded from the root `Sdk` attribute and nothing else.

use crate::error::{ParseError, require};
use regex::Regex;
use roxmltree::{Document, Node};
use slnmeta_core::model::{
    AssemblyReference, BuildConfiguration, PackageReference, ProjectDocument, ProjectFileFormat,
    ProjectOutputType,
};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// File extensions of MSBuild project manifests.
pub const PROJECT_EXTENSIONS: [&str; 3] = [".csproj", ".vbproj", ".fsproj"];

/// Whether `name` ends in a project manifest extension (case-insensitive).
pub fn is_project_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    PROJECT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Parse a project manifest. `path` is the manifest's file name or path.
pub fn parse_project(content: &str, path: &str) -> Result<ProjectDocument, ParseError> {
    require(content, "project content")?;
    require(path, "project path")?;

    let doc = Document::parse(content)?;
    let root = doc.root_element();
    let sdk_attr = root.attribute("Sdk");
    let file_format = if sdk_attr.is_some() {
        ProjectFileFormat::Modern
    } else {
        ProjectFileFormat::Legacy
    };
    let sdk = sdk_attr
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let elements: Vec<Node> = root.descendants().filter(Node::is_element).collect();

    let document = ProjectDocument {
        assembly_info: assembly_info(&elements),
        assembly_references: assembly_references(&elements)?,
        build_configurations: build_configurations(&elements),
        target_frameworks: target_frameworks(&elements),
        package_references: package_references(&elements),
        project_references: project_references(&elements),
        output_type: output_type(&elements, path)?,
        file_format,
        sdk,
        has_messages: has_messages(content),
    };

    tracing::debug!(
        path,
        format = %document.file_format,
        output = %document.output_type,
        packages = document.package_references.len(),
        references = document.assembly_references.len(),
        "parsed project manifest"
    );
    Ok(document)
}

fn local_name<'a>(node: &Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

fn element_text(node: &Node) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn child_text(node: &Node, name: &str) -> Option<String> {
    node.children()
        .filter(|c| c.is_element() && local_name(c) == name)
        .find_map(|c| element_text(&c))
}

fn output_type(elements: &[Node], path: &str) -> Result<ProjectOutputType, ParseError> {
    let mut declared = Vec::new();
    for node in elements.iter().filter(|n| local_name(n) == "OutputType") {
        if let Some(text) = element_text(node) {
            declared.push(text.parse::<ProjectOutputType>()?);
        }
    }

    Ok(match declared.first() {
        Some(kind) => *kind,
        None if is_project_file(path) => ProjectOutputType::Library,
        None => ProjectOutputType::Placeholder,
    })
}

/// Map a legacy `vX.Y[.Z]` framework version to its short form; short forms pass through.
pub fn normalize_framework(token: &str) -> String {
    let token = token.trim();
    if let Some(version) = token.strip_prefix(['v', 'V'])
        && !version.is_empty()
        && version.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return format!("net{}", version.replace('.', ""));
    }
    token.to_string()
}

fn target_frameworks(elements: &[Node]) -> Vec<String> {
    static FRAMEWORK_RE: OnceLock<Regex> = OnceLock::new();
    let framework_re =
        FRAMEWORK_RE.get_or_init(|| Regex::new(r"(?i)^TargetFramework(Version)?s?$").unwrap());

    let mut frameworks: Vec<String> = Vec::new();
    for node in elements.iter().filter(|n| framework_re.is_match(local_name(n))) {
        let Some(text) = element_text(node) else {
            continue;
        };
        for token in text.split(';').filter(|t| !t.trim().is_empty()) {
            let framework = normalize_framework(token);
            if !frameworks.contains(&framework) {
                frameworks.push(framework);
            }
        }
    }
    frameworks
}

fn build_configurations(elements: &[Node]) -> Vec<BuildConfiguration> {
    static CONDITION_RE: OnceLock<Regex> = OnceLock::new();
    let condition_re = CONDITION_RE
        .get_or_init(|| Regex::new(r"==\s*'\s*([^|']+?)\s*\|\s*([^']+?)\s*'").unwrap());

    let mut configurations: Vec<BuildConfiguration> = Vec::new();
    for node in elements.iter().filter(|n| local_name(n) == "PropertyGroup") {
        let Some(caps) = node
            .attribute("Condition")
            .and_then(|condition| condition_re.captures(condition))
        else {
            continue;
        };
        let configuration = BuildConfiguration {
            configuration: caps[1].to_string(),
            platform: caps[2].to_string(),
        };
        if !configurations.contains(&configuration) {
            configurations.push(configuration);
        }
    }
    configurations
}

/// Parse a strong-name `Include` value: `Name, Version=..., Culture=..., PublicKeyToken=...`.
pub fn parse_assembly_include(include: &str) -> Result<AssemblyReference, ParseError> {
    let mut parts = include.split(',').map(str::trim);
    let mut reference = AssemblyReference {
        name: parts.next().unwrap_or_default().to_string(),
        ..AssemblyReference::default()
    };

    for part in parts.filter(|p| !p.is_empty()) {
        let Some((key, value)) = part.split_once('=') else {
            return Err(ParseError::Malformed(format!(
                "assembly reference attribute '{}' has no value in '{}'",
                part, include
            )));
        };
        let value = Some(value.trim().to_string());
        match key.trim().to_ascii_lowercase().as_str() {
            "version" => reference.version = value,
            "culture" => reference.culture = value,
            "publickeytoken" => reference.public_key_token = value,
            "processorarchitecture" => reference.processor_architecture = value,
            _ => {
                return Err(ParseError::Malformed(format!(
                    "unknown assembly reference key '{}' in '{}'",
                    key.trim(),
                    include
                )));
            }
        }
    }
    Ok(reference)
}

fn assembly_references(elements: &[Node]) -> Result<Vec<AssemblyReference>, ParseError> {
    let mut references = Vec::new();
    for node in elements.iter().filter(|n| local_name(n) == "Reference") {
        let Some(include) = node.attribute("Include") else {
            continue;
        };
        let mut reference = parse_assembly_include(include)?;
        reference.hint_path = child_text(node, "HintPath");
        reference.specific_version = match child_text(node, "SpecificVersion") {
            Some(text) => Some(parse_bool(&text)?),
            None => None,
        };
        references.push(reference);
    }
    Ok(references)
}

fn parse_bool(text: &str) -> Result<bool, ParseError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::Malformed(format!(
            "expected a boolean, found '{}'",
            text
        ))),
    }
}

fn package_references(elements: &[Node]) -> Vec<PackageReference> {
    elements
        .iter()
        .filter(|n| local_name(n) == "PackageReference")
        .filter_map(|node| {
            let name = node.attribute("Include")?.trim();
            if name.is_empty() {
                return None;
            }
            let mut version = node.attribute("Version").map(str::to_string);
            if let Some(element_version) = child_text(node, "Version") {
                version = Some(element_version);
            }
            Some(PackageReference {
                name: name.to_string(),
                version,
                target_framework: None,
            })
        })
        .collect()
}

fn assembly_info(elements: &[Node]) -> BTreeMap<String, String> {
    elements
        .iter()
        .filter(|n| local_name(n).starts_with("Assembly"))
        .filter(|n| !n.children().any(|c| c.is_element()))
        .filter_map(|n| Some((local_name(n).to_string(), element_text(n)?)))
        .collect()
}

fn project_references(elements: &[Node]) -> Vec<String> {
    elements
        .iter()
        .filter(|n| local_name(n) == "ProjectReference")
        .filter(|n| n.attributes().next().is_some() && n.children().any(|c| c.is_element()))
        .filter_map(|n| n.attribute("Include").map(str::to_string))
        .collect()
}

fn has_messages(content: &str) -> bool {
    let lower = content.to_ascii_lowercase();
    lower.contains(r#"include="resources\"#)
        || lower.contains(r#"include="resources/"#)
        || lower.contains("messages.resx")
}
