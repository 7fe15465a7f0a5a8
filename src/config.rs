//! Fetch configuration.
//!
//! Every knob the fetcher uses is carried in [`FetchConfig`] and passed in explicitly, so
//! tests can shrink delays and page sizes without touching globals.

use crate::error::{Result, ScholarError};
use crate::identifier::ProfileId;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default Google Scholar URL
pub const DEFAULT_SCHOLAR_URL: &str = "https://scholar.google.com";

/// Path of the profile/citations endpoint
pub const CITATIONS_PATH: &str = "/citations";

/// Publications returned per page request
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page the server honours; bigger requests come back truncated
pub const MAX_PAGE_SIZE: usize = 100;

/// Requests issued per page before giving up on rate limiting
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Wait after each 429 response
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(60);

/// User agent string for requests
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Settings for one fetch session.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Scholar host, or a mirror (trailing slash is ignored)
    pub base_url: String,
    /// Interface language (`hl`); parsing assumes English labels
    pub language: String,
    /// Publications requested per page (`pagesize`)
    pub page_size: usize,
    /// Maximum requests per page offset while rate limited
    pub max_attempts: u32,
    /// Fixed delay after a 429 response
    pub rate_limit_delay: Duration,
    /// Browser-identifying header sent with every request
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Proxy URL (e.g., "http://127.0.0.1:7890")
    pub proxy: Option<String>,
    /// Directory receiving raw page bodies for debugging
    pub dump_html_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SCHOLAR_URL.to_string(),
            language: "en".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rate_limit_delay: DEFAULT_RATE_LIMIT_DELAY,
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            proxy: None,
            dump_html_dir: None,
        }
    }
}

impl FetchConfig {
    /// Reject values the fetch loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ScholarError::Config(format!(
                "page size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        if self.max_attempts == 0 {
            return Err(ScholarError::Config("retry count must be at least 1".to_string()));
        }
        self.citations_url().map(|_| ())
    }

    /// URL of the profile page: `{base}/citations?user=..&hl=..`
    pub fn profile_url(&self, id: &ProfileId) -> Result<Url> {
        let mut url = self.citations_url()?;
        url.query_pairs_mut()
            .append_pair("user", id.as_str())
            .append_pair("hl", &self.language);
        Ok(url)
    }

    /// URL of one publication page starting at `cstart`.
    pub fn publications_url(&self, id: &ProfileId, cstart: usize) -> Result<Url> {
        let mut url = self.citations_url()?;
        url.query_pairs_mut()
            .append_pair("user", id.as_str())
            .append_pair("hl", &self.language)
            .append_pair("cstart", &cstart.to_string())
            .append_pair("pagesize", &self.page_size.to_string());
        Ok(url)
    }

    fn citations_url(&self) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        Url::parse(&format!("{}{}", base, CITATIONS_PATH))
            .map_err(|e| ScholarError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))
    }
}
