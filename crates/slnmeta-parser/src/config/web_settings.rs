//! `appSettings` XML dialect, with standard `connectionStrings/add` entries.

use super::{ConfigSettings, parse_connection_string, with_environment};
use crate::error::{ParseError, require};
use roxmltree::{Document, Node};
use slnmeta_core::model::ApplicationSetting;

const SECTION: &str = "appSettings";

/// Parse `appSettings/add` key/value pairs and `connectionStrings/add` entries.
pub fn parse_web_settings(content: &str) -> Result<ConfigSettings, ParseError> {
    require(content, "web settings content")?;
    let doc = Document::parse(content)?;
    Ok(extract(&doc))
}

pub fn parse_web_settings_file(
    file_name: &str,
    content: &str,
    strict: bool,
) -> Result<ConfigSettings, ParseError> {
    with_environment(file_name, strict, || parse_web_settings(content))
}

fn adds<'a, 'input>(
    doc: &'a Document<'input>,
    container: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants()
        .filter(move |n| n.is_element() && n.tag_name().name() == container)
        .flat_map(|c| c.children())
        .filter(|n| n.is_element() && n.tag_name().name() == "add")
}

pub(crate) fn extract(doc: &Document) -> ConfigSettings {
    let mut settings = ConfigSettings::default();

    for add in adds(doc, SECTION) {
        let Some(key) = add.attribute("key").map(str::trim).filter(|k| !k.is_empty()) else {
            continue;
        };
        settings.app_settings.push(ApplicationSetting::new(
            key,
            add.attribute("value").map(str::to_string),
            Some(SECTION.to_string()),
        ));
    }

    for add in adds(doc, "connectionStrings") {
        let (Some(name), Some(value)) = (add.attribute("name"), add.attribute("connectionString"))
        else {
            continue;
        };
        let mut connection = parse_connection_string(name.trim(), value);
        connection.provider_name = add.attribute("providerName").map(str::to_string);
        settings.connection_strings.push(connection);
    }

    settings
}
