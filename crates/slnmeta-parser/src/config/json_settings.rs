//! `appsettings*.json` dialect.

use super::{ConfigSettings, parse_connection_string, with_environment};
use crate::error::{ParseError, require};
use serde_json::{Map, Value};
use slnmeta_core::model::ApplicationSetting;

/// Sections read besides `ConnectionStrings` and `AppSettings`. Their entries
/// are prefixed with the section name.
const NAMED_SECTIONS: [&str; 5] = ["Monitoring", "Persistence", "ServiceBus", "OAuth2", "Logging"];

/// Parse the fixed-shape JSON settings document.
///
/// Section names match case-insensitively and a `null` section is empty.
/// `AppSettings` entries are named by their key. Entries of the other named
/// sections are named `Section:Key`, with nested objects flattened by `:`.
/// Connection strings are normalised like their XML counterparts.
pub fn parse_json_settings(content: &str) -> Result<ConfigSettings, ParseError> {
    require(content, "json settings content")?;
    let document: Map<String, Value> = serde_json::from_str(content)?;

    let mut settings = ConfigSettings::default();

    for entries in section(&document, "ConnectionStrings")? {
        for (name, value) in entries {
            let text = render(value).unwrap_or_default();
            settings
                .connection_strings
                .push(parse_connection_string(name, &text));
        }
    }

    for entries in section(&document, "AppSettings")? {
        flatten_section(&mut settings.app_settings, "AppSettings", None, entries);
    }

    for name in NAMED_SECTIONS {
        for entries in section(&document, name)? {
            flatten_section(&mut settings.app_settings, name, Some(name), entries);
        }
    }

    Ok(settings)
}

/// Every top-level object whose key equals `name` ignoring ASCII case.
fn section<'a>(
    document: &'a Map<String, Value>,
    name: &str,
) -> Result<Vec<&'a Map<String, Value>>, ParseError> {
    let mut found = Vec::new();
    for (key, value) in document {
        if !key.eq_ignore_ascii_case(name) {
            continue;
        }
        match value {
            Value::Object(entries) => found.push(entries),
            Value::Null => {}
            other => {
                return Err(ParseError::Malformed(format!(
                    "section '{}' must be an object, found {}",
                    key, other
                )));
            }
        }
    }
    Ok(found)
}

pub fn parse_json_settings_file(
    file_name: &str,
    content: &str,
    strict: bool,
) -> Result<ConfigSettings, ParseError> {
    with_environment(file_name, strict, || parse_json_settings(content))
}

fn flatten_section(
    out: &mut Vec<ApplicationSetting>,
    section: &str,
    prefix: Option<&str>,
    entries: &Map<String, Value>,
) {
    for (key, value) in entries {
        let name = match prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.clone(),
        };
        flatten_value(out, section, name, value);
    }
}

fn flatten_value(out: &mut Vec<ApplicationSetting>, section: &str, name: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_value(out, section, format!("{}:{}", name, key), nested);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten_value(out, section, format!("{}:{}", name, index), nested);
            }
        }
        scalar => out.push(ApplicationSetting::new(
            name,
            render(scalar),
            Some(section.to_string()),
        )),
    }
}

/// Text form of a scalar. `null` has none.
fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
