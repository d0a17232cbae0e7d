use slnmeta_core::environment::DeployEnvironment;
use slnmeta_core::model::{ProjectMetadata, ProjectStub, VersioningMode};
use slnmeta_parser::ParseError;
use slnmeta_parser::assembly_info::parse_assembly_info;
use slnmeta_parser::config::{
    environment_from_file_name, parse_config_file, parse_database_settings_file,
    parse_json_settings_file,
};
use slnmeta_parser::gitversion::parse_gitversion;
use slnmeta_parser::packages::parse_packages;

const WEB_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <appSettings>
    <add key="ClientValidationEnabled" value="true" />
    <add key="UnobtrusiveJavaScriptEnabled" value="true" />
  </appSettings>
  <connectionStrings>
    <add name="Default" connectionString="Data Source=sqlqa01;Initial Catalog=Shop;Application Name=Shop.Web" />
  </connectionStrings>
</configuration>"#;

#[test]
fn web_qa_config_tags_qa() {
    let settings = parse_config_file(r"src\Shop.Web\Web.qa.config", WEB_CONFIG, true).unwrap();
    assert_eq!(settings.app_settings.len(), 2);
    assert_eq!(settings.connection_strings.len(), 1);
    assert!(
        settings
            .app_settings
            .iter()
            .all(|s| s.environment == DeployEnvironment::Qa)
    );
    assert_eq!(settings.connection_strings[0].environment, DeployEnvironment::Qa);
    assert_eq!(
        settings.connection_strings[0].application_name.as_deref(),
        Some("Shop.Web")
    );
}

#[test]
fn base_config_has_no_environment() {
    let settings = parse_config_file("Web.config", WEB_CONFIG, true).unwrap();
    assert!(
        settings
            .app_settings
            .iter()
            .all(|s| s.environment == DeployEnvironment::None)
    );
}

#[test]
fn strict_mapping_rejects_unknown_environment() {
    let err = parse_config_file("Web.uat.config", WEB_CONFIG, true).unwrap_err();
    assert!(matches!(err, ParseError::Malformed(_)));
    let lenient = parse_config_file("Web.uat.config", WEB_CONFIG, false).unwrap();
    assert_eq!(lenient.app_settings.len(), 2);
}

#[test]
fn environment_mapping_is_case_insensitive() {
    for name in ["web.QA.config", "web.qa.config", "WEB.Qa.CONFIG"] {
        assert_eq!(
            environment_from_file_name(name, true).unwrap(),
            DeployEnvironment::Qa
        );
    }
}

#[test]
fn json_and_database_dialects_share_tagging() {
    let json = r#"{ "AppSettings": { "Region": "eu-west" } }"#;
    let settings = parse_json_settings_file("appsettings.lab.json", json, true).unwrap();
    assert_eq!(settings.app_settings[0].environment, DeployEnvironment::Lab);

    let xml = r#"<database><instances><instance name="db1" type="Postgres" /></instances></database>"#;
    let settings = parse_database_settings_file("database.dev.config", xml, true).unwrap();
    assert_eq!(
        settings.database_instances[0].environment,
        DeployEnvironment::Development
    );
}

#[test]
fn config_overlay_preserves_project_identity() {
    let stub = ProjectStub {
        type_ids: vec!["FAE04EC0-301F-11D3-BF4B-00C04F79EFBC".to_string()],
        name: "Shop.Web".to_string(),
        path: r"src\Shop.Web\Shop.Web.csproj".to_string(),
        id: "11111111-2222-3333-4444-555555555555".to_string(),
    };
    let mut project = ProjectMetadata::from_stub(&stub, None);
    for (name, content) in [("Web.config", WEB_CONFIG), ("Web.qa.config", WEB_CONFIG)] {
        let settings = parse_config_file(name, content, true).unwrap();
        project.update(settings.into());
    }

    assert_eq!(project.id, stub.id);
    assert_eq!(project.name_in_solution, stub.name);
    assert_eq!(project.type_ids, stub.type_ids);
    assert_eq!(project.path_relative_to_solution, stub.path);
    assert_eq!(project.app_settings.len(), 4);
    assert_eq!(project.connection_strings.len(), 2);
}

#[test]
fn package_manifest_and_assembly_info_overlay() {
    let mut project = ProjectMetadata::default();
    let packages = parse_packages(
        r#"<packages><package id="EntityFramework" version="6.4.4" targetFramework="net48" /></packages>"#,
    )
    .unwrap();
    project.update_from_packages(packages);
    let pairs = parse_assembly_info("[assembly: AssemblyProduct(\"Shop\")]\n").unwrap();
    project.update_from_assembly_info(pairs);

    assert_eq!(project.package_references.len(), 1);
    assert_eq!(project.package_references[0].target_framework.as_deref(), Some("net48"));
    assert_eq!(project.assembly_info.get("AssemblyProduct").unwrap(), "Shop");
}

#[test]
fn gitversion_file() {
    let config = parse_gitversion(
        "mode: ContinuousDelivery\r\nnext-version: 3.0.0\r\ntag-prefix: 'v'\r\n",
    )
    .unwrap();
    assert_eq!(config.mode, Some(VersioningMode::ContinuousDelivery));
    assert_eq!(config.next_version.as_deref(), Some("3.0.0"));
    assert_eq!(config.tag_prefix.as_deref(), Some("v"));
}
