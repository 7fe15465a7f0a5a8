//! Page transport and clock seams.
//!
//! [`PageSource`] performs exactly one GET and reports the status without judging it; the
//! retry decisions live in the fetcher. [`Sleeper`] is the only suspension point of the
//! retry loop, so tests can substitute a clock that records instead of waiting.

use crate::config::FetchConfig;
use crate::cookies::Cookie;
use crate::error::{Result, ScholarError};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Status and body of one HTTP response
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: StatusCode,
    pub body: String,
}

impl PageResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Retrieves raw pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get(&self, url: &Url) -> Result<PageResponse>;
}

/// Waits out a rate-limit delay.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// HTTP page source with a browser user agent and optional session cookies
pub struct ReqwestPageSource {
    client: reqwest::Client,
    cookie_header: String,
}

impl ReqwestPageSource {
    /// Build the HTTP client from the fetch settings.
    ///
    /// Only cookies for google domains are attached.
    pub fn new(config: &FetchConfig, cookies: &[Cookie]) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            cookie_header: build_cookie_header(cookies),
        })
    }
}

#[async_trait]
impl PageSource for ReqwestPageSource {
    async fn get(&self, url: &Url) -> Result<PageResponse> {
        let mut request = self
            .client
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9");

        if !self.cookie_header.is_empty() {
            request = request.header("Cookie", &self.cookie_header);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "HTTP response");

        let body = response.text().await?;
        Ok(PageResponse { status, body })
    }
}

/// Build HTTP client with optional proxy
fn build_http_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .cookie_store(true);

    if let Some(proxy_url) = config.proxy.as_deref() {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
            ScholarError::Config(format!("Invalid proxy URL '{}': {}", proxy_url, e))
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ScholarError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Build cookie header string from cookie list
fn build_cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .filter(|c| c.domain.contains("google"))
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}
