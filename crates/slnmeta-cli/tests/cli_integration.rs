//! Integration tests for slnmeta-cli functionality.
//! Tests the underlying library functions that the CLI commands invoke.

use slnmeta_core::config::ScanConfig;
use slnmeta_core::environment::DeployEnvironment;
use slnmeta_core::locator::SourceLocator;
use slnmeta_core::schema::Inventory;
use slnmeta_core::storage;
use slnmeta_scan::{NoopObserver, ScanEvent, Scanner, UnitKind, open_source};
use std::path::Path;
use std::sync::Mutex;

const SOLUTION: &str = "Microsoft Visual Studio Solution File, Format Version 12.00
# Visual Studio Version 17
Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Billing.Worker\", \"Billing.Worker\\Billing.Worker.csproj\", \"{5D3E2F10-7A6B-4C8D-9E0F-1A2B3C4D5E6F}\"
EndProject
";

const PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk.Worker">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <OutputType>Exe</OutputType>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Serilog" Version="3.1.1" />
  </ItemGroup>
</Project>"#;

const APPSETTINGS_QA: &str = r#"{
  "ConnectionStrings": { "Billing": "Server=sqlqa01;Database=billing;User Id=svc;Password=secret" }
}"#;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn scan_dir(root: &Path, config: ScanConfig) -> (SourceLocator, slnmeta_scan::ScanReport) {
    let absolute = root.canonicalize().unwrap();
    let locator = SourceLocator::file_system(absolute.to_string_lossy(), true).unwrap();
    let source = open_source(&locator, &config.sources).unwrap();
    let scanner = Scanner::new(source, config);
    let report = scanner
        .process_source(&locator, &[], &NoopObserver)
        .unwrap();
    (locator, report)
}

#[test]
fn test_storage_load_nonexistent() {
    let tmpdir = tempfile::tempdir().unwrap();
    let result = storage::load(&storage::default_inventory_file(tmpdir.path()));
    assert!(result.is_err(), "loading a missing inventory should fail");
}

#[test]
fn test_scan_then_save_and_load() {
    let tmpdir = tempfile::tempdir().unwrap();
    write(tmpdir.path(), "Billing.sln", SOLUTION);
    write(tmpdir.path(), "Billing.Worker/Billing.Worker.csproj", PROJECT);
    write(
        tmpdir.path(),
        "Billing.Worker/appsettings.qa.json",
        APPSETTINGS_QA,
    );

    let (root, report) = scan_dir(tmpdir.path(), ScanConfig::sequential());
    assert!(report.is_clean(), "failures: {:?}", report.failures);

    let inventory = Inventory::new(root, report.solutions);
    let path = storage::default_inventory_file(tmpdir.path());
    storage::save(&path, &inventory).unwrap();

    let loaded = storage::load(&path).unwrap();
    assert_eq!(loaded.solutions.len(), 1);
    assert_eq!(loaded.project_count(), 1);

    let project = &loaded.solutions[0].projects[0];
    assert_eq!(project.name_in_solution, "Billing.Worker");
    assert_eq!(project.target_frameworks, vec!["net8.0".to_string()]);
    assert_eq!(project.package_references[0].name, "Serilog");

    let conn = &project.connection_strings[0];
    assert_eq!(conn.environment, DeployEnvironment::Qa);
    assert_eq!(conn.server.as_deref(), Some("sqlqa01"));
    assert_eq!(conn.database.as_deref(), Some("billing"));
}

#[test]
fn test_inventory_directory_is_not_rescanned() {
    let tmpdir = tempfile::tempdir().unwrap();
    write(tmpdir.path(), "Billing.sln", SOLUTION);
    write(tmpdir.path(), "Billing.Worker/Billing.Worker.csproj", PROJECT);

    let (root, report) = scan_dir(tmpdir.path(), ScanConfig::sequential());
    let first = Inventory::new(root, report.solutions);
    storage::save(&storage::default_inventory_file(tmpdir.path()), &first).unwrap();

    let (_, second) = scan_dir(tmpdir.path(), ScanConfig::sequential());
    assert!(second.is_clean());
    assert_eq!(second.solutions.len(), 1);
    assert_eq!(second.project_count(), first.project_count());
}

#[test]
fn test_scan_reports_processing_events() {
    let tmpdir = tempfile::tempdir().unwrap();
    write(tmpdir.path(), "Billing.sln", SOLUTION);
    write(tmpdir.path(), "Billing.Worker/Billing.Worker.csproj", PROJECT);

    let absolute = tmpdir.path().canonicalize().unwrap();
    let root = SourceLocator::file_system(absolute.to_string_lossy(), true).unwrap();
    let config = ScanConfig::sequential();
    let scanner = Scanner::new(open_source(&root, &config.sources).unwrap(), config);

    let seen = Mutex::new(Vec::new());
    let observer = |event: ScanEvent<'_>| {
        if let ScanEvent::Processing { locator, kind } = event {
            seen.lock()
                .unwrap()
                .push((kind, locator.file_name().to_string()));
        }
    };
    scanner.process_source(&root, &[], &observer).unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(
        seen,
        vec![
            (UnitKind::Solution, "Billing.sln".to_string()),
            (UnitKind::Project, "Billing.Worker.csproj".to_string()),
        ]
    );
}

#[test]
fn test_config_file_overrides() {
    let tmpdir = tempfile::tempdir().unwrap();
    write(
        tmpdir.path(),
        ".slnmeta/config.toml",
        r#"
[performance]
solution_parallelism = 2

[overlays]
assembly_info = false

[filters]
ignore = ["**/legacy/**"]
strict_environments = true
"#,
    );

    let config = ScanConfig::load(tmpdir.path()).unwrap();
    assert_eq!(config.performance.solution_parallelism, 2);
    assert_eq!(config.performance.project_parallelism, 4);
    assert!(!config.overlays.assembly_info);
    assert!(config.overlays.packages);
    assert_eq!(config.filters.ignore, vec!["**/legacy/**".to_string()]);
    assert!(config.filters.strict_environments);
}

#[test]
fn test_config_rejects_zero_parallelism() {
    let tmpdir = tempfile::tempdir().unwrap();
    let path = tmpdir.path().join("custom.toml");
    std::fs::write(&path, "[performance]\nproject_parallelism = 0\n").unwrap();
    assert!(ScanConfig::load_file(&path).is_err());
}
