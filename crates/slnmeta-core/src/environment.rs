//! Deploy environments and the settings that are scoped to one.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of deployment environments inferred from file-name conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeployEnvironment {
    #[default]
    None,
    Development,
    Lab,
    Qa,
    ProdSupport,
    Training,
    Production,
}

impl DeployEnvironment {
    pub const ALL: [DeployEnvironment; 7] = [
        DeployEnvironment::None,
        DeployEnvironment::Development,
        DeployEnvironment::Lab,
        DeployEnvironment::Qa,
        DeployEnvironment::ProdSupport,
        DeployEnvironment::Training,
        DeployEnvironment::Production,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DeployEnvironment::None => "None",
            DeployEnvironment::Development => "Development",
            DeployEnvironment::Lab => "Lab",
            DeployEnvironment::Qa => "Qa",
            DeployEnvironment::ProdSupport => "ProdSupport",
            DeployEnvironment::Training => "Training",
            DeployEnvironment::Production => "Production",
        }
    }
}

impl fmt::Display for DeployEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map an environment token (as found in a file name) to a [`DeployEnvironment`].
///
/// Matching is case-insensitive. Build-flavour tokens (`debug`, `release`) and the
/// empty string map to `None`. Any other unrecognised token is an error when
/// `strict` is set and `None` otherwise.
pub fn map_environment(value: &str, strict: bool) -> Result<DeployEnvironment, ModelError> {
    let env = match value.trim().to_ascii_lowercase().as_str() {
        "dev" | "development" => DeployEnvironment::Development,
        "lab" => DeployEnvironment::Lab,
        "qa" => DeployEnvironment::Qa,
        "prod" | "production" => DeployEnvironment::Production,
        "prodsupport" => DeployEnvironment::ProdSupport,
        "training" => DeployEnvironment::Training,
        "" | "debug" | "release" | "none" => DeployEnvironment::None,
        _ if strict => return Err(ModelError::UnknownEnvironment(value.to_string())),
        _ => DeployEnvironment::None,
    };
    Ok(env)
}

/// A setting record that belongs to one deploy environment.
pub trait EnvironmentScoped {
    fn environment(&self) -> DeployEnvironment;
    fn set_environment(&mut self, environment: DeployEnvironment);
}

/// Tag every record in `items` with `environment`.
pub fn tag_environment<T: EnvironmentScoped>(items: &mut [T], environment: DeployEnvironment) {
    for item in items {
        item.set_environment(environment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_known_tokens() {
        assert_eq!(map_environment("QA", true).unwrap(), DeployEnvironment::Qa);
        assert_eq!(map_environment("dev", true).unwrap(), DeployEnvironment::Development);
        assert_eq!(
            map_environment("Development", true).unwrap(),
            DeployEnvironment::Development
        );
        assert_eq!(map_environment("lab", true).unwrap(), DeployEnvironment::Lab);
        assert_eq!(map_environment("Prod", true).unwrap(), DeployEnvironment::Production);
        assert_eq!(
            map_environment("PRODSUPPORT", true).unwrap(),
            DeployEnvironment::ProdSupport
        );
        assert_eq!(map_environment("training", true).unwrap(), DeployEnvironment::Training);
    }

    #[test]
    fn test_build_flavours_map_to_none() {
        assert_eq!(map_environment("debug", true).unwrap(), DeployEnvironment::None);
        assert_eq!(map_environment("Release", true).unwrap(), DeployEnvironment::None);
        assert_eq!(map_environment("", true).unwrap(), DeployEnvironment::None);
    }

    #[test]
    fn test_unknown_strict_vs_lenient() {
        assert_eq!(
            map_environment("unknown", true),
            Err(ModelError::UnknownEnvironment("unknown".to_string()))
        );
        assert_eq!(map_environment("unknown", false).unwrap(), DeployEnvironment::None);
    }

    #[test]
    fn test_mapping_is_pure() {
        for _ in 0..3 {
            assert_eq!(map_environment("qa", false).unwrap(), DeployEnvironment::Qa);
        }
    }

    struct Tagged(DeployEnvironment);

    impl EnvironmentScoped for Tagged {
        fn environment(&self) -> DeployEnvironment {
            self.0
        }
        fn set_environment(&mut self, environment: DeployEnvironment) {
            self.0 = environment;
        }
    }

    #[test]
    fn test_tag_environment_tags_all() {
        let mut items = vec![Tagged(DeployEnvironment::None), Tagged(DeployEnvironment::Lab)];
        tag_environment(&mut items, DeployEnvironment::Training);
        assert!(items.iter().all(|t| t.environment() == DeployEnvironment::Training));
    }
}
