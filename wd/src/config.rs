//! wsdeploy configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

/// Default request timeout for remote calls
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Main wsdeploy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote workspace connection settings
    pub workspace: WorkspaceConfig,

    /// Local artifact locations and remote placement
    pub deploy: DeployConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .wsdeploy.yml
        let local_config = PathBuf::from(".wsdeploy.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/wsdeploy/wsdeploy.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("wsdeploy").join("wsdeploy.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialised
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = config_path.cloned().unwrap_or_else(|| PathBuf::from(".wsdeploy.yml"));
        let content = fs::read_to_string(path).ok()?;
        let config: Self = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Remote workspace connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Environment variable holding the workspace base URL
    #[serde(rename = "host-env")]
    pub host_env: String,

    /// Environment variable holding the bearer token
    #[serde(rename = "token-env")]
    pub token_env: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            host_env: "DATABRICKS_HOST".to_string(),
            token_env: "DATABRICKS_TOKEN".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl WorkspaceConfig {
    /// Resolve credentials from the process environment
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.credentials_from(|var| std::env::var(var).ok())
    }

    /// Resolve credentials through an arbitrary lookup
    ///
    /// Both values are required and must be non-empty.
    pub fn credentials_from<F>(&self, lookup: F) -> Result<Credentials, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!(host_env = %self.host_env, token_env = %self.token_env, "credentials_from: called");
        let require = |var: &str| -> Result<String, ConfigError> {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingCredential { var: var.to_string() })
        };

        let host = require(&self.host_env)?;
        let token = require(&self.token_env)?;

        Ok(Credentials {
            host: host.trim_end_matches('/').to_string(),
            token,
        })
    }
}

/// Workspace address and bearer token
#[derive(Clone)]
pub struct Credentials {
    /// Base URL, without trailing slash
    pub host: String,
    /// Bearer token
    pub token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Local artifact locations and remote placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Directory holding `*.lvdash.json` dashboard definitions
    #[serde(rename = "dashboards-dir")]
    pub dashboards_dir: PathBuf,

    /// Directory holding `*.json` job definitions
    #[serde(rename = "jobs-dir")]
    pub jobs_dir: PathBuf,

    /// Directory holding `*.ipynb` notebooks
    #[serde(rename = "notebooks-dir")]
    pub notebooks_dir: PathBuf,

    /// Remote folder that dashboards and notebooks are placed under
    #[serde(rename = "parent-path")]
    pub parent_path: String,

    /// Suffix appended to imported notebook names
    #[serde(rename = "notebook-suffix")]
    pub notebook_suffix: String,

    /// External CLI used for notebook import
    #[serde(rename = "cli-binary")]
    pub cli_binary: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            dashboards_dir: PathBuf::from("dashboards"),
            jobs_dir: PathBuf::from("jobs"),
            notebooks_dir: PathBuf::from("notebooks"),
            parent_path: "/Shared".to_string(),
            notebook_suffix: "_prod".to_string(),
            cli_binary: "databricks".to_string(),
        }
    }
}
