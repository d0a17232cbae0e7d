//! Configuration file dialects.
//!
//! Three XML dialects (application settings, web settings, structured
//! database settings) and one JSON dialect. Every dialect produces a
//! [`ConfigSettings`]; the `*_file` forms derive the [`DeployEnvironment`]
//! from the file name and tag every record with it.

pub mod app_settings;
pub mod connection_string;
pub mod database;
pub mod json_settings;
pub mod web_settings;

pub use app_settings::{parse_application_settings, parse_application_settings_file};
pub use connection_string::parse_connection_string;
pub use database::{parse_database_settings, parse_database_settings_file};
pub use json_settings::{parse_json_settings, parse_json_settings_file};
pub use web_settings::{parse_web_settings, parse_web_settings_file};

use crate::classify::{FileKind, classify};
use crate::error::{ParseError, require};
use regex::Regex;
use roxmltree::Document;
use slnmeta_core::environment::{DeployEnvironment, map_environment, tag_environment};
use slnmeta_core::model::{
    ApplicationSetting, ConnectionStringSetting, DatabaseInstance, DatabaseType, ProjectMetadata,
};
use std::sync::OnceLock;

/// Settings extracted from one configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSettings {
    pub app_settings: Vec<ApplicationSetting>,
    pub connection_strings: Vec<ConnectionStringSetting>,
    pub database_instances: Vec<DatabaseInstance>,
    pub database_types: Vec<DatabaseType>,
}

impl ConfigSettings {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.app_settings.len()
            + self.connection_strings.len()
            + self.database_instances.len()
            + self.database_types.len()
    }

    pub fn extend(&mut self, other: ConfigSettings) {
        self.app_settings.extend(other.app_settings);
        self.connection_strings.extend(other.connection_strings);
        self.database_instances.extend(other.database_instances);
        self.database_types.extend(other.database_types);
    }

    /// Tag every record with `environment`.
    pub fn tag(&mut self, environment: DeployEnvironment) {
        tag_environment(&mut self.app_settings, environment);
        tag_environment(&mut self.connection_strings, environment);
        tag_environment(&mut self.database_instances, environment);
        tag_environment(&mut self.database_types, environment);
    }
}

/// A settings-only project record, ready to be overlaid with [`ProjectMetadata::update`].
impl From<ConfigSettings> for ProjectMetadata {
    fn from(settings: ConfigSettings) -> Self {
        ProjectMetadata {
            app_settings: settings.app_settings,
            connection_strings: settings.connection_strings,
            database_instances: settings.database_instances,
            database_types: settings.database_types,
            ..ProjectMetadata::default()
        }
    }
}

/// Derive the deploy environment from a config file name.
///
/// `web.qa.config` and `appsettings.Production.json` carry an environment;
/// `web.config` and `appsettings.json` do not. Directory components of
/// `file_name` are ignored.
pub fn environment_from_file_name(
    file_name: &str,
    strict: bool,
) -> Result<DeployEnvironment, ParseError> {
    static XML_RE: OnceLock<Regex> = OnceLock::new();
    static JSON_RE: OnceLock<Regex> = OnceLock::new();
    let xml_re = XML_RE.get_or_init(|| Regex::new(r"(?i)\.([^.\\/]+)\.config$").unwrap());
    let json_re = JSON_RE.get_or_init(|| Regex::new(r"(?i)^appsettings\.([^.]+)\.json$").unwrap());

    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let token = xml_re
        .captures(name)
        .or_else(|| json_re.captures(name))
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();

    Ok(map_environment(&token, strict)?)
}

/// Parse any configuration file, picking the dialect from its name.
///
/// XML files are read with all three XML dialects over one document, so a
/// `web.config` that carries both `appSettings` and `connectionStrings`
/// yields both. Files that are not configuration files yield nothing.
pub fn parse_config_file(
    file_name: &str,
    content: &str,
    strict: bool,
) -> Result<ConfigSettings, ParseError> {
    match classify(file_name) {
        FileKind::JsonSettings => parse_json_settings_file(file_name, content, strict),
        FileKind::XmlConfig => with_environment(file_name, strict, || parse_xml_config(content)),
        _ => Ok(ConfigSettings::default()),
    }
}

/// Run all XML dialects over one document.
pub fn parse_xml_config(content: &str) -> Result<ConfigSettings, ParseError> {
    require(content, "config content")?;
    let doc = Document::parse(content)?;

    let mut settings = app_settings::extract(&doc);
    settings.extend(web_settings::extract(&doc));
    settings.extend(database::extract(&doc)?);
    Ok(settings)
}

/// Parse with `parse`, then tag the result with the environment named by `file_name`.
pub(crate) fn with_environment<F>(
    file_name: &str,
    strict: bool,
    parse: F,
) -> Result<ConfigSettings, ParseError>
where
    F: FnOnce() -> Result<ConfigSettings, ParseError>,
{
    require(file_name, "config file name")?;
    let environment = environment_from_file_name(file_name, strict)?;
    let mut settings = parse()?;
    settings.tag(environment);

    tracing::debug!(
        file = file_name,
        %environment,
        settings = settings.len(),
        "parsed config file"
    );
    Ok(settings)
}

/// Non-blank, trimmed element text.
pub(crate) fn node_text(node: &roxmltree::Node) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
