//! Application configuration with layered loading.
//!
//! Uses figment to merge, in increasing precedence:
//!
//! 1. Built-in defaults
//! 2. TOML config file (if PDC_CONFIG_FILE is set)
//! 3. Environment variables (PDC_*)

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_CAPACITY;

mod validation;

pub use validation::{ConfigError, normalize_database_id};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding the record blob.
    ///
    /// Set via PDC_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Maximum number of stored records before the oldest are evicted.
    ///
    /// Set via PDC_CAPACITY.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// User-Agent string for page fetches and API calls.
    ///
    /// Set via PDC_USER_AGENT.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network timeout in milliseconds.
    ///
    /// Set via PDC_TIMEOUT_MS.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes read from a fetched page.
    ///
    /// Set via PDC_MAX_BYTES.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Notion integration token. Only needed for sync.
    ///
    /// Set via PDC_NOTION_API_KEY.
    #[serde(default)]
    pub notion_api_key: Option<String>,

    /// Notion database receiving synced pages. Dashes are ignored.
    ///
    /// Set via PDC_NOTION_DATABASE_ID.
    #[serde(default)]
    pub notion_database_id: Option<String>,

    /// Base URL of the Notion API.
    ///
    /// Set via PDC_NOTION_BASE_URL.
    #[serde(default = "default_notion_base_url")]
    pub notion_base_url: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pdc-data.sqlite")
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_user_agent() -> String {
    "pdc/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_notion_base_url() -> String {
    "https://api.notion.com/v1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            capacity: default_capacity(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            notion_api_key: None,
            notion_database_id: None,
            notion_base_url: default_notion_base_url(),
        }
    }
}

/// Credentials required for Notion sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionCredentials {
    pub api_key: String,
    pub database_id: String,
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed,
    /// or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PDC_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PDC_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Notion credentials, checked only when sync is requested.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if either value is unset and
    /// `ConfigError::Invalid` if the database id is malformed.
    pub fn require_notion_credentials(&self) -> Result<NotionCredentials, ConfigError> {
        let api_key = self
            .notion_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "notion_api_key".into(),
                hint: "Set PDC_NOTION_API_KEY environment variable".into(),
            })?;
        let database_id = self.notion_database_id.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "notion_database_id".into(),
            hint: "Set PDC_NOTION_DATABASE_ID environment variable".into(),
        })?;

        Ok(NotionCredentials { api_key: api_key.trim().to_string(), database_id: normalize_database_id(database_id)? })
    }
}
