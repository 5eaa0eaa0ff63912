// src/core/config_manager.rs
//! Layered configuration: built-in defaults, optional YAML profile file,
//! then environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONFIG_FILE: &str = "jobmatch.yaml";
const DATA_DIR_NAME: &str = ".jobmatch";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub service: ServiceConfig,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_url: String,
    /// No timeout unless configured.
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub auth_url: Option<String>,
    pub anon_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

/// One profile section of the config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct ProfileSection {
    api_url: Option<String>,
    timeout_seconds: Option<u64>,
    auth_url: Option<String>,
    anon_key: Option<String>,
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: ProfileSection,
    #[serde(default)]
    production: ProfileSection,
}

impl ConfigManager {
    /// Load configuration. An explicit `path` must exist; otherwise
    /// `jobmatch.yaml` in the working directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let environment = Self::get_environment();
        info!("Loading configuration for environment: {}", environment);

        let section = match path {
            Some(path) => Self::load_section(path, &environment)?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_section(&default_path, &environment)?
                } else {
                    ProfileSection::default()
                }
            }
        };

        Self::resolve(environment, section, |key| std::env::var(key).ok())
    }

    fn get_environment() -> String {
        std::env::var("JOBMATCH_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_section(path: &Path, environment: &str) -> Result<ProfileSection> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse_section(&content, environment)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn parse_section(content: &str, environment: &str) -> Result<ProfileSection> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    /// Apply environment overrides on top of a file section.
    fn resolve<F>(environment: String, section: ProfileSection, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = env("JOBMATCH_API_URL").or(section.api_url);
        let api_url = match api_url {
            Some(url) => url,
            None if environment == "production" => {
                anyhow::bail!("JOBMATCH_API_URL must be set for the production environment")
            }
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout_seconds = match env("JOBMATCH_TIMEOUT_SECS") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("JOBMATCH_TIMEOUT_SECS must be a number of seconds"))?,
            ),
            None => section.timeout_seconds,
        };

        let auth_url = env("JOBMATCH_AUTH_URL")
            .or_else(|| env("SUPABASE_URL"))
            .or(section.auth_url);
        let anon_key = env("JOBMATCH_AUTH_KEY")
            .or_else(|| env("SUPABASE_KEY"))
            .or(section.anon_key);

        let data_dir = env("JOBMATCH_DATA_DIR")
            .map(PathBuf::from)
            .or(section.data_dir)
            .unwrap_or_else(|| match env("HOME") {
                Some(home) => PathBuf::from(home).join(DATA_DIR_NAME),
                None => PathBuf::from(DATA_DIR_NAME),
            });

        Ok(Self {
            environment,
            service: ServiceConfig {
                api_url,
                timeout_seconds,
            },
            identity: IdentityConfig { auth_url, anon_key },
            storage: StorageConfig { data_dir },
        })
    }
}

impl StorageConfig {
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }
}
