//! Scanning one branch of a local Git repository.

use git2::{Repository, Signature};
use slnmeta_core::config::{ScanConfig, SourcesConfig};
use slnmeta_core::locator::SourceLocator;
use slnmeta_scan::{NoopObserver, Scanner, open_source};
use std::path::Path;
use tempfile::TempDir;

const SOLUTION: &str = "Microsoft Visual Studio Solution File, Format Version 12.00
Project(\"{9A19103F-16F7-4668-BE54-9A1E7A4F7556}\") = \"Inventory.Api\", \"src\\Inventory.Api\\Inventory.Api.csproj\", \"{3C2B1A09-8F7E-4D6C-B5A4-93827160F5E4}\"
EndProject
";

const PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk.Web">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
</Project>"#;

const APPSETTINGS: &str = r#"{
  "ConnectionStrings": { "Inventory": "Host=pg01;Port=5432;Database=inventory" },
  "AppSettings": { "PageSize": 50 }
}"#;

/// Create `<git_root>/inventory` with one commit on `main`.
fn commit_repository(git_root: &Path, files: &[(&str, &str)]) {
    let workdir = git_root.join("inventory");
    let repo = Repository::init(&workdir).unwrap();
    let mut index = repo.index().unwrap();
    for (path, content) in files {
        let full = workdir.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(&full, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("ci", "ci@example.com").unwrap();
    let commit = repo.commit(None, &sig, &sig, "initial", &tree, &[]).unwrap();
    repo.branch("main", &repo.find_commit(commit).unwrap(), true)
        .unwrap();
}

#[test]
fn scan_git_branch() {
    let tmp = TempDir::new().unwrap();
    commit_repository(
        tmp.path(),
        &[
            ("Inventory.sln", SOLUTION),
            ("src/Inventory.Api/Inventory.Api.csproj", PROJECT),
            ("src/Inventory.Api/appsettings.json", APPSETTINGS),
            ("src/Inventory.Api/appsettings.Production.json", r#"{ "AppSettings": { "PageSize": 500 } }"#),
        ],
    );

    let sources = SourcesConfig {
        git_root: Some(tmp.path().to_path_buf()),
    };
    let root = SourceLocator::git("inventory", "main", "/", true).unwrap();
    let source = open_source(&root, &sources).unwrap();
    let scanner = Scanner::new(source, ScanConfig::default());
    let report = scanner.process_source(&root, &[], &NoopObserver).unwrap();

    assert!(report.is_clean(), "failures: {:?}", report.failures);
    let solution = &report.solutions[0];
    let locator = solution.locator.as_ref().unwrap();
    assert_eq!(locator.repository(), Some("inventory"));
    assert_eq!(locator.branch(), Some("main"));
    assert_eq!(locator.path(), "/Inventory.sln");

    let project = &solution.projects[0];
    assert_eq!(project.name_in_solution, "Inventory.Api");
    assert_eq!(project.connection_strings.len(), 1);
    assert_eq!(project.connection_strings[0].port, Some(5432));
    assert_eq!(project.app_settings.len(), 2);
    assert_eq!(report.setting_count(), 3);
}
