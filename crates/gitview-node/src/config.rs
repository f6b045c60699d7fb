//! Node configuration.
//!
//! Settings are layered: built-in defaults, then an optional YAML file,
//! then `GITVIEW__`-prefixed environment variables where nested keys are
//! separated by double underscores (`GITVIEW__WEB__SITE_NAME` sets
//! `web.site_name`). Command line flags are applied last by the binary.

use config::{Config, Environment, File};
use gitview_types::RepositoryModel;
use gitview_web::{UserAccount, WebSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "GITVIEW";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the gitview node.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    pub server: ServerConfig,
    pub repositories: RepositoriesConfig,
    pub web: WebSettings,
    pub users: Vec<UserAccount>,
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        }
    }
}

/// Where repositories live and how they are presented.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RepositoriesConfig {
    /// Folder scanned for bare repositories.
    pub base_dir: PathBuf,
    /// Per-repository metadata. Repositories without an entry are public.
    pub models: Vec<RepositoryModel>,
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./repositories"),
            models: Vec::new(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl NodeConfig {
    /// Loads the configuration from `path` (required when given) and the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }
        let config: NodeConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.web.log_page_size == 0 {
            return Err(ConfigError::Invalid(
                "web.log_page_size must be greater than zero".to_string(),
            ));
        }

        let mut usernames = HashSet::new();
        for user in &self.users {
            if user.username.trim().is_empty() {
                return Err(ConfigError::Invalid("user without a username".to_string()));
            }
            if !usernames.insert(user.username.to_lowercase()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate user {}",
                    user.username
                )));
            }
        }

        let mut names = HashSet::new();
        for model in &self.repositories.models {
            if !names.insert(model.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate repository {}",
                    model.name
                )));
            }
        }
        Ok(())
    }
}
