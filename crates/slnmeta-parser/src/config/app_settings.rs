//! `applicationSettings` XML dialect.

use super::{ConfigSettings, node_text, with_environment};
use crate::error::{ParseError, require};
use roxmltree::{Document, Node};
use slnmeta_core::model::ApplicationSetting;

const GROUP_SUFFIX: &str = "Properties.Settings";

/// Parse `applicationSettings/*Properties.Settings/setting` entries.
pub fn parse_application_settings(content: &str) -> Result<ConfigSettings, ParseError> {
    require(content, "application settings content")?;
    let doc = Document::parse(content)?;
    Ok(extract(&doc))
}

pub fn parse_application_settings_file(
    file_name: &str,
    content: &str,
    strict: bool,
) -> Result<ConfigSettings, ParseError> {
    with_environment(file_name, strict, || parse_application_settings(content))
}

pub(crate) fn extract(doc: &Document) -> ConfigSettings {
    let mut settings = ConfigSettings::default();

    let containers = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "applicationSettings");
    for container in containers {
        let groups = container
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name().ends_with(GROUP_SUFFIX));
        for group in groups {
            let section = group.tag_name().name();
            settings.app_settings.extend(
                group
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == "setting")
                    .filter_map(|n| setting(&n, section)),
            );
        }
    }
    settings
}

fn setting(node: &Node, section: &str) -> Option<ApplicationSetting> {
    let name = node.attribute("name")?.trim();
    if name.is_empty() {
        return None;
    }
    let value = node
        .children()
        .find(|c| c.is_element() && c.tag_name().name() == "value")
        .and_then(|v| node_text(&v));
    Some(ApplicationSetting::new(name, value, Some(section.to_string())))
}
