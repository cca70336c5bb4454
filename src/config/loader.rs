//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use crate::error::{ImportError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Explicit config file (skips the project and user tiers).
pub const ENV_CONFIG_PATH: &str = "PROJECT_IMPORT_CONFIG_PATH";
/// Connection string for the target store.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_CSV_DIR: &str = "PROJECT_IMPORT_CSV_DIR";
pub const ENV_DEFAULT_CREATOR_ID: &str = "PROJECT_IMPORT_DEFAULT_CREATOR_ID";
pub const ENV_DEFAULT_STATUS: &str = "PROJECT_IMPORT_DEFAULT_STATUS";

/// Configuration tier priority (lowest to highest).
///
/// Built-in defaults sit below every tier and are not recorded as a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// `./project-import.yaml`
    Project = 1,
    /// `~/.project-import/config.yaml`
    User = 2,
    /// `.env` file, then process environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Config file locations for each tier.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Explicit config file; when set, the project and user tiers are ignored.
    pub explicit: Option<PathBuf>,
    /// Project-level config file.
    pub project_file: Option<PathBuf>,
    /// User-level config file.
    pub user_file: Option<PathBuf>,
    /// Dotenv file. Its values apply only where the process environment has none.
    pub env_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from the environment and defaults.
    pub fn discover() -> Self {
        Self {
            explicit: std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from),
            project_file: Some(PathBuf::from("project-import.yaml")),
            user_file: dirs::home_dir().map(|h| h.join(".project-import").join("config.yaml")),
            env_file: Some(PathBuf::from(".env")),
        }
    }

    /// Use a single explicit file.
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit: Some(path.into()),
            ..Self::default()
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Config,
    /// Files that contributed, in merge order.
    sources: Vec<(ConfigTier, PathBuf)>,
}

impl ConfigLoader {
    /// Load from discovered paths, `./.env` and the process environment.
    ///
    /// An explicit file replaces the project and user tiers but not `.env`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut paths = ConfigPaths::discover();
        if let Some(path) = explicit {
            paths.explicit = Some(path.to_path_buf());
        }
        Self::load_with(paths, |key| std::env::var(key).ok())
    }

    /// Load with explicit paths and an environment lookup.
    pub fn load_with<F>(paths: ConfigPaths, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sources = Vec::new();
        let mut layers: Vec<Value> = Vec::new();

        let defaults = serde_json::to_value(Config::default())
            .map_err(|e| ImportError::config("defaults", e.to_string()))?;
        layers.push(defaults);

        if let Some(path) = &paths.explicit {
            if !path.exists() {
                return Err(ImportError::config(
                    path.display().to_string(),
                    "config file not found",
                ));
            }
            layers.push(read_yaml(path)?);
            sources.push((ConfigTier::Project, path.clone()));
        } else {
            for (tier, file) in [
                (ConfigTier::Project, &paths.project_file),
                (ConfigTier::User, &paths.user_file),
            ] {
                if let Some(path) = file.as_ref().filter(|p| p.exists()) {
                    layers.push(read_yaml(path)?);
                    sources.push((tier, path.clone()));
                }
            }
        }

        let merged = deep_merge_all(layers);
        let mut config: Config = serde_json::from_value(merged)
            .map_err(|e| ImportError::config("config", e.to_string()))?;

        let dotenv = match paths.env_file.as_ref().filter(|p| p.is_file()) {
            Some(path) => {
                sources.push((ConfigTier::Environment, path.clone()));
                read_dotenv(path)?
            }
            None => HashMap::new(),
        };
        apply_env_overrides(&mut config, |key| {
            env(key).or_else(|| dotenv.get(key).cloned())
        })?;
        config.validate()?;

        for (tier, path) in &sources {
            debug!(tier = %tier, path = %path.display(), "Loaded config file");
        }

        Ok(Self { config, sources })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ImportError::config(path.display().to_string(), e.to_string()))?;
    let value: Value = serde_yaml::from_str(&content)
        .map_err(|e| ImportError::config(path.display().to_string(), e.to_string()))?;
    Ok(value)
}

/// Read `KEY=value` pairs from a dotenv file without touching the process environment.
fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let invalid = |e: dotenv::Error| ImportError::config(path.display().to_string(), e.to_string());
    dotenv::from_path_iter(path)
        .map_err(invalid)?
        .map(|item| item.map_err(invalid))
        .collect()
}

/// Apply environment variable overrides to config.
fn apply_env_overrides<F>(config: &mut Config, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_DATABASE_URL) {
        config.database.url = Some(url);
    }

    if let Some(dir) = env(ENV_CSV_DIR) {
        config.input.csv_dir = PathBuf::from(dir);
    }

    if let Some(id) = env(ENV_DEFAULT_CREATOR_ID) {
        config.import.default_creator_id = id
            .trim()
            .parse()
            .map_err(|_| ImportError::config(ENV_DEFAULT_CREATOR_ID, format!("not an integer: '{}'", id)))?;
    }

    if let Some(status) = env(ENV_DEFAULT_STATUS) {
        config.import.default_status = status;
    }

    Ok(())
}
