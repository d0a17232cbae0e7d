//! Package manifest (`packages.config`) parsing.

use crate::error::{ParseError, require};
use roxmltree::Document;
use slnmeta_core::model::PackageReference;

pub const PACKAGE_MANIFEST_NAME: &str = "packages.config";

/// Parse a flat package list: one element per package with `id`, `version` and
/// an optional `targetFramework`. Elements without an `id` are skipped.
pub fn parse_packages(content: &str) -> Result<Vec<PackageReference>, ParseError> {
    require(content, "package manifest content")?;

    let doc = Document::parse(content)?;
    let packages: Vec<PackageReference> = doc
        .root_element()
        .children()
        .filter(|n| n.is_element())
        .filter_map(|node| {
            let id = node.attribute("id")?.trim();
            if id.is_empty() {
                return None;
            }
            Some(PackageReference {
                name: id.to_string(),
                version: node.attribute("version").map(str::to_string),
                target_framework: node.attribute("targetFramework").map(str::to_string),
            })
        })
        .collect();

    tracing::debug!(packages = packages.len(), "parsed package manifest");
    Ok(packages)
}
