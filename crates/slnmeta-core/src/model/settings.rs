//! Environment-scoped configuration records extracted from config files.

use crate::environment::{DeployEnvironment, EnvironmentScoped};
use serde::{Deserialize, Serialize};

/// A single application setting (`appSettings`, `applicationSettings` or JSON).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSetting {
    pub name: String,
    pub value: Option<String>,
    /// Settings group, JSON section or `appSettings`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub environment: DeployEnvironment,
}

impl ApplicationSetting {
    pub fn new(name: impl Into<String>, value: Option<String>, section: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
            section,
            environment: DeployEnvironment::None,
        }
    }
}

/// A database or cache connection, normalised from any config dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStringSetting {
    pub name: String,
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user_id: Option<String>,
    pub password: Option<String>,
    pub application_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    pub environment: DeployEnvironment,
}

impl ConnectionStringSetting {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A named database server instance and its engine type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInstance {
    pub name: String,
    pub instance_type: Option<String>,
    pub environment: DeployEnvironment,
}

/// A named database and its role/type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseType {
    pub name: String,
    pub database_type: Option<String>,
    pub environment: DeployEnvironment,
}

macro_rules! environment_scoped {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl EnvironmentScoped for $ty {
                fn environment(&self) -> DeployEnvironment {
                    self.environment
                }

                fn set_environment(&mut self, environment: DeployEnvironment) {
                    self.environment = environment;
                }
            }
        )+
    };
}

environment_scoped!(
    ApplicationSetting,
    ConnectionStringSetting,
    DatabaseInstance,
    DatabaseType
);
