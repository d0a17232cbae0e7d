//! CLI binary for slnmeta: scan solution trees and query the resulting inventory.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use slnmeta_core::config::ScanConfig;
use slnmeta_core::environment::{DeployEnvironment, map_environment};
use slnmeta_core::locator::SourceLocator;
use slnmeta_core::schema::Inventory;
use slnmeta_core::storage;
use slnmeta_scan::{ScanEvent, Scanner, UnitKind, open_source};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "slnmeta", about = "Solution, project and configuration metadata extractor")]
struct Cli {
    /// Scan root, or the directory holding repository clones with --repo (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Config file (defaults to <root>/.slnmeta/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan every solution under the root and write an inventory
    Scan(ScanArgs),

    /// Show inventory statistics
    Info {
        /// Inventory file (defaults to <root>/.slnmeta/inventory.json)
        #[arg(short, long)]
        inventory: Option<PathBuf>,
    },

    /// List settings grouped by deploy environment
    Settings {
        /// Inventory file (defaults to <root>/.slnmeta/inventory.json)
        #[arg(short, long)]
        inventory: Option<PathBuf>,

        /// Only show this environment (dev, qa, prod, ...)
        #[arg(short, long)]
        environment: Option<String>,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Scan one branch of a local Git clone named REPO under the root
    #[arg(long)]
    repo: Option<String>,

    /// Branch to read with --repo
    #[arg(long, default_value = "main", requires = "repo")]
    branch: String,

    /// Extra glob patterns to ignore (repeatable)
    #[arg(long)]
    ignore: Vec<String>,

    /// Output file (defaults to <root>/.slnmeta/inventory.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Solutions processed concurrently
    #[arg(long)]
    solution_parallelism: Option<usize>,

    /// Projects processed concurrently per solution
    #[arg(long)]
    project_parallelism: Option<usize>,

    /// Fail config files whose environment suffix is unknown
    #[arg(long)]
    strict_environments: bool,

    /// Skip packages.config overlays
    #[arg(long)]
    no_packages: bool,

    /// Skip config file overlays
    #[arg(long)]
    no_config_files: bool,

    /// Skip AssemblyInfo overlays
    #[arg(long)]
    no_assembly_info: bool,

    /// Skip GitVersion.yml
    #[arg(long)]
    no_git_version: bool,
}

fn get_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.root {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let root = get_root(&cli)?;
    let inventory_path =
        |explicit: Option<PathBuf>| explicit.unwrap_or_else(|| storage::default_inventory_file(&root));

    match cli.command {
        Commands::Scan(args) => {
            let config = load_config(&root, cli.config.as_deref(), &args)?;
            let output = inventory_path(args.output.clone());
            cmd_scan(&root, config, &args, &output)
        }
        Commands::Info { inventory } => cmd_info(&inventory_path(inventory)),
        Commands::Settings {
            inventory,
            environment,
        } => cmd_settings(&inventory_path(inventory), environment.as_deref()),
    }
}

/// Config file, then environment, then command-line flags.
fn load_config(root: &Path, explicit: Option<&Path>, args: &ScanArgs) -> Result<ScanConfig> {
    let mut config = match explicit {
        Some(path) => ScanConfig::load_file(path)?,
        None => ScanConfig::load(root)?,
    };

    if let Some(n) = args.solution_parallelism {
        config.performance.solution_parallelism = n;
    }
    if let Some(n) = args.project_parallelism {
        config.performance.project_parallelism = n;
    }
    config.filters.strict_environments |= args.strict_environments;
    config.overlays.packages &= !args.no_packages;
    config.overlays.config_files &= !args.no_config_files;
    config.overlays.assembly_info &= !args.no_assembly_info;
    config.overlays.git_version &= !args.no_git_version;
    if args.repo.is_some() && config.sources.git_root.is_none() {
        config.sources.git_root = Some(root.to_path_buf());
    }

    config.validate()?;
    Ok(config)
}

fn root_locator(root: &Path, args: &ScanArgs) -> Result<SourceLocator> {
    let locator = match &args.repo {
        Some(repo) => SourceLocator::git(repo.as_str(), args.branch.as_str(), "/", true)?,
        None => {
            let absolute = root
                .canonicalize()
                .with_context(|| format!("scan root {} does not exist", root.display()))?;
            SourceLocator::file_system(absolute.to_string_lossy(), true)?
        }
    };
    Ok(locator)
}

fn cmd_scan(root: &Path, config: ScanConfig, args: &ScanArgs, output: &Path) -> Result<()> {
    let root_locator = root_locator(root, args)?;
    let source = open_source(&root_locator, &config.sources)
        .with_context(|| format!("failed to open source {}", root_locator))?;
    let scanner = Scanner::new(source, config);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    spinner.set_message("Enumerating source...");

    let observer = |event: ScanEvent<'_>| match event {
        ScanEvent::Processing { locator, kind } => {
            let label = match kind {
                UnitKind::Solution => "solution",
                UnitKind::Project => "project",
            };
            spinner.set_message(format!("Scanning {} {}", label, locator.file_name()));
            spinner.tick();
        }
        ScanEvent::Failed { locator, error } => {
            spinner.println(format!("  failed: {} ({})", locator, error));
        }
    };

    let report = scanner.process_source(&root_locator, &args.ignore, &observer)?;
    spinner.finish_and_clear();

    let failures: Vec<String> = report
        .failures
        .iter()
        .flat_map(|f| match f.error.leaves().as_slice() {
            [] => vec![f.to_string()],
            leaves => leaves.iter().map(|leaf| leaf.to_string()).collect(),
        })
        .collect();

    let inventory = Inventory::new(root_locator, report.solutions);
    storage::save(output, &inventory)?;

    println!("Solutions: {}", inventory.solutions.len());
    println!("Projects:  {}", inventory.project_count());
    println!("Settings:  {}", inventory.setting_count());
    println!("Inventory written to {}", output.display());

    if !failures.is_empty() {
        eprintln!("\n{} failure(s):", failures.len());
        for failure in &failures {
            eprintln!("  {}", failure);
        }
        anyhow::bail!("{} unit(s) failed during the scan", failures.len());
    }
    Ok(())
}

fn load_inventory(path: &Path) -> Result<Option<Inventory>> {
    if !path.exists() {
        eprintln!("No inventory found at {}. Run `slnmeta scan` first.", path.display());
        return Ok(None);
    }
    Ok(Some(storage::load(path)?))
}

fn cmd_info(path: &Path) -> Result<()> {
    let Some(inventory) = load_inventory(path)? else {
        return Ok(());
    };

    println!("Inventory v{}", inventory.version);
    println!("Root: {}", inventory.root);
    println!("Generated: {}", inventory.generated_at);
    println!();
    println!("Solutions: {}", inventory.solutions.len());
    println!("Projects: {}", inventory.project_count());
    println!("Settings: {}", inventory.setting_count());

    for solution in &inventory.solutions {
        println!(
            "\n{} ({} projects, format {})",
            solution.name,
            solution.projects.len(),
            solution.format_version.as_deref().unwrap_or("?")
        );
        if let Some(git_version) = &solution.git_version {
            let mode = git_version
                .mode
                .map_or_else(|| "default".to_string(), |m| m.to_string());
            println!(
                "  versioning: {} next {}",
                mode,
                git_version.next_version.as_deref().unwrap_or("-")
            );
        }
        for project in &solution.projects {
            let output = project
                .output_type
                .map_or_else(|| "?".to_string(), |o| o.to_string());
            let format = project
                .file_format
                .map_or_else(|| "?".to_string(), |f| f.to_string());
            println!(
                "  {} [{}, {}] {} | {} packages, {} references, {} settings",
                project.name_in_solution,
                output,
                format,
                project.target_frameworks.join(";"),
                project.package_references.len(),
                project.assembly_references.len(),
                project.setting_count()
            );
        }
    }
    Ok(())
}

fn cmd_settings(path: &Path, environment: Option<&str>) -> Result<()> {
    let Some(inventory) = load_inventory(path)? else {
        return Ok(());
    };
    let only = environment
        .map(|e| map_environment(e, true))
        .transpose()
        .context("unknown --environment")?;

    let mut by_environment: BTreeMap<DeployEnvironment, Vec<String>> = BTreeMap::new();
    for solution in &inventory.solutions {
        for project in &solution.projects {
            let owner = format!("{}/{}", solution.name, project.name_in_solution);
            for setting in &project.app_settings {
                by_environment.entry(setting.environment).or_default().push(format!(
                    "{}  app  {} = {}",
                    owner,
                    setting.name,
                    setting.value.as_deref().unwrap_or("")
                ));
            }
            for conn in &project.connection_strings {
                by_environment.entry(conn.environment).or_default().push(format!(
                    "{}  conn {} -> {}/{}",
                    owner,
                    conn.name,
                    conn.server.as_deref().unwrap_or("?"),
                    conn.database.as_deref().unwrap_or("?")
                ));
            }
            for instance in &project.database_instances {
                by_environment.entry(instance.environment).or_default().push(format!(
                    "{}  inst {} ({})",
                    owner,
                    instance.name,
                    instance.instance_type.as_deref().unwrap_or("?")
                ));
            }
            for db in &project.database_types {
                by_environment.entry(db.environment).or_default().push(format!(
                    "{}  db   {} ({})",
                    owner,
                    db.name,
                    db.database_type.as_deref().unwrap_or("?")
                ));
            }
        }
    }

    for (env, lines) in &by_environment {
        if only.is_some_and(|o| o != *env) {
            continue;
        }
        println!("{} ({} settings)", env, lines.len());
        for line in lines {
            println!("  {}", line);
        }
    }
    Ok(())
}
