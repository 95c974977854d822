use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BCB_URL: &str =
    "https://api.bcb.gov.br/dados/serie/bcdata.sgs.1/dados?formato=json";
pub const DEFAULT_RESTART_COMMAND: &str = "npm start";
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BcbProviderConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub bcb: Option<BcbProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            bcb: Some(BcbProviderConfig {
                url: DEFAULT_BCB_URL.to_string(),
            }),
        }
    }
}

fn default_restart_command() -> String {
    DEFAULT_RESTART_COMMAND.to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Series URL; takes precedence over `providers.bcb.url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Shell command line run after each published quote
    #[serde(default = "default_restart_command")]
    pub restart_command: String,
    /// strftime pattern used to render today's date like the series does
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            endpoint: None,
            providers: ProvidersConfig::default(),
            restart_command: default_restart_command(),
            date_format: default_date_format(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to the
    /// built-in defaults when no file has been created there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "ptax", "ptax")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn bcb_url(&self) -> &str {
        if let Some(endpoint) = &self.endpoint {
            return endpoint;
        }
        self.providers
            .bcb
            .as_ref()
            .map_or(DEFAULT_BCB_URL, |p| &p.url)
    }
}
