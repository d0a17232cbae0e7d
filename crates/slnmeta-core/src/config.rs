//! Configuration for scan runs.
//!
//! Load order: `.slnmeta/config.toml` → environment variables → defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level scan configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub performance: PerformanceConfig,
    pub overlays: OverlayConfig,
    pub filters: FilterConfig,
    pub sources: SourcesConfig,
}

/// Degree of parallelism for the two fan-out levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Solutions processed concurrently. 1 gives a sequential, deterministic run.
    pub solution_parallelism: usize,
    /// Projects processed concurrently within one solution.
    pub project_parallelism: usize,
}

/// Per-project overlays; each can be switched off independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Overlay `packages.config` found next to the project manifest.
    pub packages: bool,
    /// Overlay every `*.config` / `appsettings*.json` under the project directory.
    pub config_files: bool,
    /// Overlay `Properties/AssemblyInfo.cs`.
    pub assembly_info: bool,
    /// Attach `GitVersion.yml` found next to the solution.
    pub git_version: bool,
}

/// Path filtering and environment mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Glob patterns (matched against `/`-separated paths) excluded from the scan.
    pub ignore: Vec<String>,
    /// Reject config files whose environment suffix is not a known deploy environment.
    pub strict_environments: bool,
}

/// Where repository-backed sources live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Directory holding local clones, addressed by repository name.
    pub git_root: Option<PathBuf>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            solution_parallelism: 4,
            project_parallelism: 4,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            packages: true,
            config_files: true,
            assembly_info: true,
            git_version: true,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore: vec![
                "**/bin/**".to_string(),
                "**/obj/**".to_string(),
                "**/node_modules/**".to_string(),
                "**/packages/**".to_string(),
            ],
            strict_environments: false,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl ScanConfig {
    /// Load config from `.slnmeta/config.toml` under `root`, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_file(&root.join(".slnmeta").join("config.toml"))
    }

    /// Load config from an explicit TOML file (defaults if it does not exist).
    pub fn load_file(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", config_path.display()))?
        } else {
            Self::default()
        };

        env_override(
            "SLNMETA_SOLUTION_PARALLELISM",
            &mut config.performance.solution_parallelism,
        );
        env_override(
            "SLNMETA_PROJECT_PARALLELISM",
            &mut config.performance.project_parallelism,
        );
        env_override(
            "SLNMETA_STRICT_ENVIRONMENTS",
            &mut config.filters.strict_environments,
        );

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.performance.solution_parallelism == 0 || self.performance.project_parallelism == 0
        {
            anyhow::bail!(
                "parallelism must be at least 1 (solutions: {}, projects: {})",
                self.performance.solution_parallelism,
                self.performance.project_parallelism,
            );
        }
        Ok(())
    }

    /// Config with both fan-out levels forced to one worker.
    pub fn sequential() -> Self {
        let mut config = Self::default();
        config.performance.solution_parallelism = 1;
        config.performance.project_parallelism = 1;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.performance.solution_parallelism, 4);
        assert_eq!(config.performance.project_parallelism, 4);
        assert!(config.overlays.packages);
        assert!(config.overlays.config_files);
        assert!(config.overlays.assembly_info);
        assert!(config.overlays.git_version);
        assert!(!config.filters.strict_environments);
        assert!(config.filters.ignore.contains(&"**/obj/**".to_string()));
        assert!(config.sources.git_root.is_none());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[performance]
solution_parallelism = 1

[overlays]
assembly_info = false

[filters]
ignore = ["**/legacy/**"]
"#;
        let config: ScanConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.performance.solution_parallelism, 1);
        assert!(!config.overlays.assembly_info);
        assert_eq!(config.filters.ignore, vec!["**/legacy/**".to_string()]);
        // Defaults for unspecified fields
        assert_eq!(config.performance.project_parallelism, 4);
        assert!(config.overlays.packages);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let config = ScanConfig::load(Path::new("/nonexistent/path")).unwrap();
        assert_eq!(config.performance.project_parallelism, 4);
    }

    #[test]
    fn test_load_rejects_zero_parallelism() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join(".slnmeta");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "[performance]\nproject_parallelism = 0\n",
        )
        .unwrap();

        assert!(ScanConfig::load(tmp.path()).is_err());
    }

    #[test]
    fn test_sequential() {
        let config = ScanConfig::sequential();
        assert_eq!(config.performance.solution_parallelism, 1);
        assert_eq!(config.performance.project_parallelism, 1);
        assert!(config.validate().is_ok());
    }
}
