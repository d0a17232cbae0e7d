//! Project-level records: the parsed project document and the merged project metadata.

use super::settings::{
    ApplicationSetting, ConnectionStringSetting, DatabaseInstance, DatabaseType,
};
use super::{overlay, overlay_some};
use crate::locator::SourceLocator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

keyword_enum!(
    /// Build output kind declared by `<OutputType>`.
    ProjectOutputType {
        Library,
        Exe,
        WinExe,
        Module,
        AppContainerExe,
        WinMdObj,
        /// Assigned to documents that are not project manifests.
        Placeholder,
    }
);

keyword_enum!(
    /// Project manifest dialect. `Modern` manifests carry a root `Sdk` attribute.
    ProjectFileFormat { Legacy, Modern }
);

/// A project entry as listed in a solution manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStub {
    pub type_ids: Vec<String>,
    pub name: String,
    /// Path relative to the solution file, as written in the manifest.
    pub path: String,
    pub id: String,
}

/// A `<Reference Include="...">` to a framework or third-party assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReference {
    pub name: String,
    pub version: Option<String>,
    pub culture: Option<String>,
    pub public_key_token: Option<String>,
    pub processor_architecture: Option<String>,
    pub hint_path: Option<String>,
    pub specific_version: Option<bool>,
}

/// A pinned package, from `<PackageReference>` or `packages.config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReference {
    pub name: String,
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_framework: Option<String>,
}

/// A `Configuration|Platform` pair from a conditional property group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildConfiguration {
    pub configuration: String,
    pub platform: String,
}

/// Everything extracted from a single project manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub assembly_info: BTreeMap<String, String>,
    pub assembly_references: Vec<AssemblyReference>,
    pub build_configurations: Vec<BuildConfiguration>,
    pub target_frameworks: Vec<String>,
    pub package_references: Vec<PackageReference>,
    pub project_references: Vec<String>,
    pub output_type: ProjectOutputType,
    pub file_format: ProjectFileFormat,
    pub sdk: Option<String>,
    pub has_messages: bool,
}

/// A project inside a solution, with metadata merged from every source that describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub id: String,
    pub name_in_solution: String,
    pub type_ids: Vec<String>,
    pub path_relative_to_solution: String,
    pub locator: Option<SourceLocator>,

    pub assembly_info: BTreeMap<String, String>,
    pub assembly_references: Vec<AssemblyReference>,
    pub build_configurations: Vec<BuildConfiguration>,
    pub target_frameworks: Vec<String>,
    pub package_references: Vec<PackageReference>,
    pub project_references: Vec<String>,
    pub output_type: Option<ProjectOutputType>,
    pub file_format: Option<ProjectFileFormat>,
    pub sdk: Option<String>,
    pub has_messages: bool,

    pub app_settings: Vec<ApplicationSetting>,
    pub connection_strings: Vec<ConnectionStringSetting>,
    pub database_instances: Vec<DatabaseInstance>,
    pub database_types: Vec<DatabaseType>,
}

impl ProjectMetadata {
    /// Seed a project from its solution entry. This is the only place identity fields are set.
    pub fn from_stub(stub: &ProjectStub, locator: Option<SourceLocator>) -> Self {
        Self {
            id: stub.id.clone(),
            name_in_solution: stub.name.clone(),
            type_ids: stub.type_ids.clone(),
            path_relative_to_solution: stub.path.clone(),
            locator,
            ..Self::default()
        }
    }

    /// Overlay the fields of a parsed project document.
    ///
    /// Identity, locator and setting collections are left untouched.
    pub fn update_from_project(&mut self, document: ProjectDocument) {
        for (key, value) in document.assembly_info {
            self.assembly_info.insert(key, value);
        }
        overlay(&mut self.assembly_references, document.assembly_references);
        overlay(&mut self.build_configurations, document.build_configurations);
        overlay(&mut self.target_frameworks, document.target_frameworks);
        overlay(&mut self.package_references, document.package_references);
        overlay(&mut self.project_references, document.project_references);
        self.output_type = Some(document.output_type);
        self.file_format = Some(document.file_format);
        overlay(&mut self.sdk, document.sdk);
        self.has_messages = document.has_messages;
    }

    /// Full overlay from another project record.
    ///
    /// Scalar and list fields are replaced when the incoming value is populated,
    /// assembly info is merged key by key and setting collections are appended.
    pub fn update(&mut self, other: ProjectMetadata) {
        overlay(&mut self.id, other.id);
        overlay(&mut self.name_in_solution, other.name_in_solution);
        overlay(&mut self.type_ids, other.type_ids);
        overlay(&mut self.path_relative_to_solution, other.path_relative_to_solution);
        overlay_some(&mut self.locator, other.locator);

        self.update_from_assembly_info(other.assembly_info);
        overlay(&mut self.assembly_references, other.assembly_references);
        overlay(&mut self.build_configurations, other.build_configurations);
        overlay(&mut self.target_frameworks, other.target_frameworks);
        overlay(&mut self.package_references, other.package_references);
        overlay(&mut self.project_references, other.project_references);
        overlay_some(&mut self.output_type, other.output_type);
        overlay_some(&mut self.file_format, other.file_format);
        overlay(&mut self.sdk, other.sdk);
        self.has_messages |= other.has_messages;

        self.app_settings.extend(other.app_settings);
        self.connection_strings.extend(other.connection_strings);
        self.database_instances.extend(other.database_instances);
        self.database_types.extend(other.database_types);
    }

    /// Replace package references with a package manifest's entries (when it lists any).
    pub fn update_from_packages(&mut self, packages: Vec<PackageReference>) {
        overlay(&mut self.package_references, packages);
    }

    /// Merge assembly attribute pairs; later values win per key.
    pub fn update_from_assembly_info<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in pairs {
            self.assembly_info.insert(key, value);
        }
    }

    /// Total number of environment-scoped settings.
    pub fn setting_count(&self) -> usize {
        self.app_settings.len()
            + self.connection_strings.len()
            + self.database_instances.len()
            + self.database_types.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::DeployEnvironment;

    fn stub() -> ProjectStub {
        ProjectStub {
            type_ids: vec!["9A19103F-16F7-4668-BE54-9A1E7A4F7556".to_string()],
            name: "Orders.Api".to_string(),
            path: r"src\Orders.Api\Orders.Api.csproj".to_string(),
            id: "1D5A4C4B-3C1D-4F57-9E1A-3E1B2F1A7C11".to_string(),
        }
    }

    fn document() -> ProjectDocument {
        ProjectDocument {
            assembly_info: BTreeMap::from([("AssemblyName".to_string(), "Orders.Api".to_string())]),
            assembly_references: Vec::new(),
            build_configurations: Vec::new(),
            target_frameworks: vec!["net8.0".to_string()],
            package_references: vec![PackageReference {
                name: "Serilog".to_string(),
                version: Some("3.1.1".to_string()),
                target_framework: None,
            }],
            project_references: Vec::new(),
            output_type: ProjectOutputType::Library,
            file_format: ProjectFileFormat::Modern,
            sdk: Some("Microsoft.NET.Sdk".to_string()),
            has_messages: false,
        }
    }

    #[test]
    fn test_keyword_enum_parse() {
        assert_eq!("winexe".parse::<ProjectOutputType>().unwrap(), ProjectOutputType::WinExe);
        assert_eq!(" Library ".parse::<ProjectOutputType>().unwrap(), ProjectOutputType::Library);
        assert!("Dll".parse::<ProjectOutputType>().is_err());
    }

    #[test]
    fn test_update_from_project_keeps_identity() {
        let mut project = ProjectMetadata::from_stub(&stub(), None);
        project.update_from_project(document());
        assert_eq!(project.name_in_solution, "Orders.Api");
        assert_eq!(project.id, stub().id);
        assert_eq!(project.output_type, Some(ProjectOutputType::Library));
        assert_eq!(project.file_format, Some(ProjectFileFormat::Modern));
        assert_eq!(project.package_references.len(), 1);
        assert_eq!(project.assembly_info.get("AssemblyName").unwrap(), "Orders.Api");
    }

    #[test]
    fn test_config_overlay_never_touches_identity() {
        let mut project = ProjectMetadata::from_stub(&stub(), None);
        project.update_from_project(document());

        let mut setting = ApplicationSetting::new("Timeout", Some("30".to_string()), None);
        setting.environment = DeployEnvironment::Qa;
        let overlay = ProjectMetadata {
            app_settings: vec![setting],
            ..ProjectMetadata::default()
        };
        project.update(overlay);

        let original = stub();
        assert_eq!(project.id, original.id);
        assert_eq!(project.name_in_solution, original.name);
        assert_eq!(project.type_ids, original.type_ids);
        assert_eq!(project.path_relative_to_solution, original.path);
        assert_eq!(project.app_settings.len(), 1);
        assert_eq!(project.package_references.len(), 1);
        assert_eq!(project.target_frameworks, vec!["net8.0".to_string()]);
    }

    #[test]
    fn test_update_appends_settings() {
        let mut project = ProjectMetadata::default();
        for name in ["A", "B"] {
            project.update(ProjectMetadata {
                connection_strings: vec![ConnectionStringSetting::named(name)],
                ..ProjectMetadata::default()
            });
        }
        assert_eq!(project.connection_strings.len(), 2);
        assert_eq!(project.setting_count(), 2);
    }

    #[test]
    fn test_update_from_packages_replaces_only_when_non_empty() {
        let mut project = ProjectMetadata::default();
        project.update_from_project(document());
        project.update_from_packages(Vec::new());
        assert_eq!(project.package_references[0].name, "Serilog");
        project.update_from_packages(vec![
            PackageReference {
                name: "Newtonsoft.Json".to_string(),
                version: Some("13.0.3".to_string()),
                target_framework: Some("net472".to_string()),
            },
        ]);
        assert_eq!(project.package_references.len(), 1);
        assert_eq!(project.package_references[0].name, "Newtonsoft.Json");
    }
}
