use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::pipeline::FetchErrorPolicy;

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_DATABASE: &str = "STOREWATCH_DB";
pub const ENV_SHOPS_CSV: &str = "STOREWATCH_SHOPS_CSV";
pub const ENV_PROVIDER_URL: &str = "STOREWATCH_PROVIDER_URL";

const DEFAULT_SHOPS_CSV: &str = "data/shops.csv";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// database_path = "/var/lib/storewatch/shops.db"
/// on_fetch_error = "skip"
/// concurrency = 4
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeather API key.
    pub api_key: Option<String>,

    pub database_path: Option<PathBuf>,

    pub shops_csv: Option<PathBuf>,

    /// Base URL of the forecast provider; OpenWeather when unset.
    pub provider_url: Option<String>,

    #[serde(default)]
    pub on_fetch_error: FetchErrorPolicy,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            database_path: None,
            shops_csv: None,
            provider_url: None,
            on_fetch_error: FetchErrorPolicy::default(),
            concurrency: default_concurrency(),
        }
    }
}

impl Config {
    /// Load config from disk, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file(&Self::config_file_path()?)?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Override fields from environment variables; empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(path) = var(ENV_DATABASE) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(path) = var(ENV_SHOPS_CSV) {
            self.shops_csv = Some(PathBuf::from(path));
        }
        if let Some(url) = var(ENV_PROVIDER_URL) {
            self.provider_url = Some(url);
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "storewatch", "storewatch")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// The forecast API key, or an error with a hint on how to set it.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `storewatch configure` or set {ENV_API_KEY} in the environment or a .env file."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Configured database path, or `shops.db` in the platform data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.data_dir().join("shops.db")),
        }
    }

    pub fn shops_csv(&self) -> PathBuf {
        self.shops_csv
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SHOPS_CSV))
    }
}
