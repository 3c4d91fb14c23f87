//! Notion API client.
//!
//! Creates one database page per synced record and verifies configured
//! credentials.
//!
//! ### API
//!
//! - **Endpoints**: `POST /v1/pages`, `GET /v1/databases/{id}`
//! - **Authentication**: bearer token, `Notion-Version: 2022-06-28`
//! - **Status mapping**: 401/403 invalid credentials, 404 database not found,
//!   other non-2xx a generic error. Failures are never retried.

pub mod error;
pub mod request;

pub use error::NotionError;
pub use request::{CreatePageRequest, RICH_TEXT_LIMIT};

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{StatusCode, header};
use serde::Deserialize;

use pdc_core::AppConfig;
use pdc_core::ContentRecord;

/// Default base URL for the Notion API.
const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// API version header value.
pub const NOTION_VERSION: &str = "2022-06-28";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_USER_AGENT: &str = "pdc/0.1";

/// Notion client configuration.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_key: String,
    pub database_id: String,
    /// Base URL (default: https://api.notion.com/v1).
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            database_id: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl NotionConfig {
    /// Build from application config.
    ///
    /// Fails with [`NotionError::MissingCredentials`] when either the key or
    /// the database id is unset.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, NotionError> {
        let credentials = config
            .require_notion_credentials()
            .map_err(|_| NotionError::MissingCredentials)?;

        Ok(Self {
            api_key: credentials.api_key,
            database_id: credentials.database_id,
            base_url: config.notion_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Map a response status to the client error it stands for.
pub fn classify_status(status: StatusCode) -> Result<(), NotionError> {
    match status.as_u16() {
        200..=299 => Ok(()),
        401 | 403 => Err(NotionError::Unauthorized),
        404 => Err(NotionError::DatabaseNotFound),
        code => Err(NotionError::HttpError { status: code }),
    }
}

/// Minimal view of a created page.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPage {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Notion API client.
#[derive(Debug, Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    config: NotionConfig,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Result<Self, NotionError> {
        if config.api_key.is_empty() || config.database_id.is_empty() {
            return Err(NotionError::MissingCredentials);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NotionError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self, NotionError> {
        Self::new(NotionConfig::from_app_config(config)?)
    }

    pub fn config(&self) -> &NotionConfig {
        &self.config
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        self.http
            .request(method, url)
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .header(header::ACCEPT, "application/json")
    }

    /// Create a page holding the record's content.
    pub async fn create_page(&self, record: &ContentRecord) -> Result<CreatedPage, NotionError> {
        let start = Instant::now();
        let body = CreatePageRequest::new(&self.config.database_id, &record.content);
        tracing::debug!(hash = %record.fingerprint, blocks = body.children.len(), "creating Notion page");

        let response = self.request(reqwest::Method::POST, "pages").json(&body).send().await?;

        let status = response.status();
        if let Err(err) = classify_status(status) {
            tracing::warn!(status = status.as_u16(), "Notion page creation failed");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        let page: CreatedPage = serde_json::from_slice(&bytes).map_err(|e| NotionError::Parse(e.to_string()))?;

        tracing::info!(page_id = %page.id, elapsed = ?start.elapsed(), "saved to Notion");
        Ok(page)
    }

    /// Check that the credentials can read the configured database.
    pub async fn verify(&self) -> Result<(), NotionError> {
        let path = format!("databases/{}", self.config.database_id);
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        classify_status(response.status())
    }
}
