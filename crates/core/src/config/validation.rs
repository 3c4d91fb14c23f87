//! Configuration validation rules.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// Strip dashes from a Notion database id and check it is 32 hex chars.
pub fn normalize_database_id(raw: &str) -> Result<String, ConfigError> {
    let id: String = raw.trim().chars().filter(|c| *c != '-').collect();
    if id.len() != 32 || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::Invalid {
            field: "notion_database_id".into(),
            reason: "must be a 32 character hex id".into(),
        });
    }
    Ok(id)
}

const MAX_CAPACITY: usize = 100_000;
const MAX_FETCH_BYTES: usize = 50 * 1024 * 1024;
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=300_000;

fn ensure(ok: bool, field: &str, reason: &str) -> Result<(), ConfigError> {
    if ok { Ok(()) } else { Err(ConfigError::Invalid { field: field.into(), reason: reason.into() }) }
}

impl AppConfig {
    /// Check loaded values.
    ///
    /// Notion credentials are optional here; a malformed database id is
    /// still rejected early. Missing credentials only fail when sync is
    /// requested, see [`AppConfig::require_notion_credentials`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure((1..=MAX_CAPACITY).contains(&self.capacity), "capacity", "must be between 1 and 100000")?;
        ensure((1..=MAX_FETCH_BYTES).contains(&self.max_bytes), "max_bytes", "must be between 1 byte and 50MB")?;
        ensure(TIMEOUT_RANGE_MS.contains(&self.timeout_ms), "timeout_ms", "must be between 100ms and 5 minutes")?;
        ensure(!self.user_agent.trim().is_empty(), "user_agent", "must not be empty")?;
        ensure(
            self.notion_base_url.starts_with("https://") || self.notion_base_url.starts_with("http://"),
            "notion_base_url",
            "must be an http(s) URL",
        )?;

        if let Some(id) = &self.notion_database_id {
            normalize_database_id(id)?;
            if self.notion_api_key.is_none() {
                tracing::warn!("notion_database_id is set without notion_api_key; sync will be unavailable");
            }
        }

        Ok(())
    }
}
