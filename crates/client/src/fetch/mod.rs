//! Page fetch for URL captures.
//!
//! The body is read chunk by chunk and abandoned as soon as it passes
//! `max_bytes`, so an oversized page never lands in memory whole.

pub mod url;

use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use reqwest::{Client, StatusCode, Url, header, redirect};

pub use self::url::{UrlError, canonicalize};

use pdc_core::{AppConfig, Error};

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.5";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Largest body accepted, in bytes (default: 5MB)
    pub max_bytes: usize,
    pub timeout: Duration,
    /// Redirect hops followed before giving up (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: 5,
        }
    }
}

/// A fetched page.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Where the page was served from after redirects
    pub final_url: Url,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Bytes,
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch a page by URL.
    ///
    /// # Errors
    ///
    /// `InvalidUrl` for unusable input, `FetchTimeout` when the configured
    /// timeout elapses, `FetchTooLarge` past `max_bytes`, `HttpError` for
    /// non-2xx responses and transport failures.
    pub async fn fetch(&self, input: &str) -> Result<FetchResponse, Error> {
        let started = Instant::now();
        let url = canonicalize(input).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let transport = |e: reqwest::Error| {
            if e.is_timeout() { Error::FetchTimeout(url.to_string()) } else { Error::HttpError(e.to_string()) }
        };

        let mut response = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, HTML_ACCEPT)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("{} returned status {}", response.url(), status.as_u16())));
        }

        let limit = self.config.max_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(Error::FetchTooLarge(format!("{url} declares more than {limit} bytes")));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            if body.len() + chunk.len() > limit {
                return Err(Error::FetchTooLarge(format!("{url} exceeds {limit} bytes")));
            }
            body.extend_from_slice(&chunk);
        }

        let fetch_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(%url, %final_url, fetch_ms, bytes = body.len(), "fetched page");

        Ok(FetchResponse { final_url, status, content_type, bytes: body.freeze(), fetch_ms })
    }
}
