//! Structured database settings XML dialect.
//!
//! ```xml
//! <database>
//!   <connectionStrings>
//!     <connection name="Orders">
//!       <parameter name="server" value="sql01" />
//!       <parameter name="database">Orders</parameter>
//!     </connection>
//!   </connectionStrings>
//!   <instances><instance name="sql01" type="SqlServer" /></instances>
//!   <databaseTypes><databaseType name="Orders" type="Oltp" /></databaseTypes>
//! </database>
//! ```

use super::{ConfigSettings, node_text, with_environment};
use crate::error::{ParseError, require};
use roxmltree::{Document, Node};
use slnmeta_core::model::{ConnectionStringSetting, DatabaseInstance, DatabaseType};

/// Parse `connectionStrings` parameter blocks, `instances` and `databaseTypes`.
///
/// A parameter name outside server, database, user id, password and
/// application name is fatal.
pub fn parse_database_settings(content: &str) -> Result<ConfigSettings, ParseError> {
    require(content, "database settings content")?;
    let doc = Document::parse(content)?;
    extract(&doc)
}

pub fn parse_database_settings_file(
    file_name: &str,
    content: &str,
    strict: bool,
) -> Result<ConfigSettings, ParseError> {
    with_environment(file_name, strict, || parse_database_settings(content))
}

fn is_element_named(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn entries<'a, 'input>(
    doc: &'a Document<'input>,
    container: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants()
        .filter(move |n| is_element_named(n, container))
        .flat_map(|c| c.children())
        .filter(Node::is_element)
}

fn name_and_type(node: &Node) -> Option<(String, Option<String>)> {
    let name = node.attribute("name")?.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), node.attribute("type").map(str::to_string)))
}

pub(crate) fn extract(doc: &Document) -> Result<ConfigSettings, ParseError> {
    let mut settings = ConfigSettings::default();

    for entry in entries(doc, "connectionStrings") {
        if entry.children().any(|c| is_element_named(&c, "parameter")) {
            settings.connection_strings.push(connection(&entry)?);
        }
    }

    settings.database_instances = entries(doc, "instances")
        .filter_map(|n| name_and_type(&n))
        .map(|(name, instance_type)| DatabaseInstance {
            name,
            instance_type,
            ..DatabaseInstance::default()
        })
        .collect();

    settings.database_types = entries(doc, "databaseTypes")
        .filter_map(|n| name_and_type(&n))
        .map(|(name, database_type)| DatabaseType {
            name,
            database_type,
            ..DatabaseType::default()
        })
        .collect();

    Ok(settings)
}

fn connection(entry: &Node) -> Result<ConnectionStringSetting, ParseError> {
    let name = entry
        .attribute("name")
        .unwrap_or_else(|| entry.tag_name().name());
    let mut setting = ConnectionStringSetting::named(name.trim());

    for parameter in entry.children().filter(|c| is_element_named(c, "parameter")) {
        let key = parameter.attribute("name").unwrap_or_default();
        let value = parameter
            .attribute("value")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| node_text(&parameter));
        match key.trim().to_ascii_lowercase().as_str() {
            "server" => setting.server = value,
            "database" => setting.database = value,
            "user id" => setting.user_id = value,
            "password" => setting.password = value,
            "application name" => setting.application_name = value,
            _ => {
                return Err(ParseError::Malformed(format!(
                    "unknown connection parameter '{}' in '{}'",
                    key, setting.name
                )));
            }
        }
    }
    Ok(setting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slnmeta_core::environment::DeployEnvironment;

    const DATABASE_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<database>
  <connectionStrings>
    <connection name="Orders">
      <parameter name="server" value="sql01" />
      <parameter name="database">Orders</parameter>
      <parameter name="User Id" value="orders_rw" />
      <parameter name="password" value="secret" />
      <parameter name="application name" value="Orders.Api" />
    </connection>
  </connectionStrings>
  <instances>
    <instance name="sql01" type="SqlServer" />
    <instance type="Oracle" />
  </instances>
  <databaseTypes>
    <databaseType name="Orders" type="Oltp" />
    <databaseType name="Warehouse" />
  </databaseTypes>
</database>"#;

    #[test]
    fn test_parse_database_settings() {
        let settings = parse_database_settings(DATABASE_CONFIG).unwrap();
        assert_eq!(settings.connection_strings.len(), 1);
        let orders = &settings.connection_strings[0];
        assert_eq!(orders.name, "Orders");
        assert_eq!(orders.server.as_deref(), Some("sql01"));
        assert_eq!(orders.database.as_deref(), Some("Orders"));
        assert_eq!(orders.user_id.as_deref(), Some("orders_rw"));
        assert_eq!(orders.password.as_deref(), Some("secret"));
        assert_eq!(orders.application_name.as_deref(), Some("Orders.Api"));

        assert_eq!(settings.database_instances.len(), 1);
        assert_eq!(settings.database_instances[0].instance_type.as_deref(), Some("SqlServer"));
        assert_eq!(settings.database_types.len(), 2);
        assert!(settings.database_types[1].database_type.is_none());
    }

    #[test]
    fn test_unknown_parameter_is_fatal() {
        let xml = r#"<database><connectionStrings><connection name="X">
            <parameter name="timeout" value="30" />
        </connection></connectionStrings></database>"#;
        assert!(matches!(
            parse_database_settings(xml),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_file_form_tags_every_collection() {
        let settings =
            parse_database_settings_file("database.prodsupport.config", DATABASE_CONFIG, true)
                .unwrap();
        assert_eq!(settings.connection_strings[0].environment, DeployEnvironment::ProdSupport);
        assert_eq!(settings.database_instances[0].environment, DeployEnvironment::ProdSupport);
        assert_eq!(settings.database_types[0].environment, DeployEnvironment::ProdSupport);
    }
}
