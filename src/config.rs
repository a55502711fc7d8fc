use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ValidationError;

/// Main configuration structure for repomirror
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Base directory holding all local mirrors
    pub base_directory: String,

    /// The set of repositories to keep mirrored
    #[serde(default)]
    pub repositories: Vec<RepositoryDescriptor>,

    /// Synchronization behavior settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One configured remote repository and how to reach it.
///
/// Immutable for the duration of a sync pass; `name` doubles as the
/// provider key selecting the URL convention.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RepositoryDescriptor {
    /// Provider key ("github", "gitlab", "bitbucket")
    pub name: String,

    /// Hosting server, e.g. "github.com"
    #[serde(default)]
    pub host: String,

    /// Organization or owner segment of the repository path
    #[serde(default)]
    pub organization: String,

    /// Repository name; also names the local mirror directory
    #[serde(default)]
    pub repository: String,

    /// Branch to clone and pull
    #[serde(default = "default_branch")]
    pub branch: String,

    /// URL scheme for the fetch URL
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Credentials embedded into the fetch URL when present
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

/// Basic-auth style credentials for a private repository
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub username: String,
    pub token: String,
}

/// Synchronization configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    /// Maximum parallel repository synchronizations
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"
}

// Default value functions
fn default_branch() -> String {
    "main".to_string()
}
fn default_protocol() -> String {
    "https".to_string()
}
fn default_max_parallel() -> usize {
    4
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_directory: "${HOME}/mirrors".to_string(),
            repositories: Vec::new(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RepositoryDescriptor {
    /// Check the required fields, one reason per failure, in the order
    /// repository, organization, host.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.repository.is_empty() {
            return Err(ValidationError::MissingRepository);
        }
        if self.organization.is_empty() {
            return Err(ValidationError::MissingOrganization);
        }
        if self.host.is_empty() {
            return Err(ValidationError::MissingHost);
        }
        Ok(())
    }

    /// Identity used for set-wide uniqueness and for the mirror directory.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.host, &self.organization, &self.repository)
    }
}

/// Validate every descriptor and reject duplicate (host, organization,
/// repository) identities. Two descriptors resolving to the same mirror
/// directory would race during a concurrent pass.
pub fn validate_set(repositories: &[RepositoryDescriptor]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();

    for descriptor in repositories {
        descriptor.validate()?;

        if !seen.insert(descriptor.identity()) {
            return Err(ValidationError::DuplicateIdentity {
                host: descriptor.host.clone(),
                organization: descriptor.organization.clone(),
                repository: descriptor.repository.clone(),
            });
        }
    }

    Ok(())
}

impl Config {
    /// Load configuration from the default location or create a default config
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            let config = Self::default();

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }

            config.save(&config_path)?;

            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        // Expand environment variables in paths
        config.expand_paths()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("repomirror").join("config.yml"))
    }

    /// Expand environment variables in configuration paths
    pub fn expand_paths(&mut self) -> Result<()> {
        self.base_directory = shellexpand::full(&self.base_directory)
            .context("Failed to expand base_directory path")?
            .into_owned();

        Ok(())
    }

    pub fn base_path(&self) -> PathBuf {
        PathBuf::from(&self.base_directory)
    }
}
