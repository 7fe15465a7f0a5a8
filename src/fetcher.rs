//! Profile and publication fetching.
//!
//! Each page request runs a small state machine:
//!
//! ```text
//! Requesting --200--> Success
//!     |  \--other--> HardFailure
//!     429
//!     v
//! RateLimited --attempts left: sleep--> Requesting (same offset)
//!     \--ceiling reached--> HardFailure (retries exhausted)
//! ```
//!
//! The publication list is walked page by page from `cstart=0` until a page holds fewer
//! rows than the page size. Requests are strictly sequential.

use crate::config::FetchConfig;
use crate::error::{Result, ScholarError};
use crate::identifier::ProfileId;
use crate::parser::PageParser;
use crate::profile::{ProfileRecord, PublicationRecord};
use crate::source::{PageSource, Sleeper};
use reqwest::StatusCode;
use std::path::Path;
use tracing::{debug, error, info, warn};
use url::Url;

/// State of a single page request
#[derive(Debug)]
enum FetchState {
    Requesting { attempt: u32 },
    RateLimited { attempt: u32 },
    Success(String),
    HardFailure(ScholarError),
}

/// Fetches profiles through a page source, parser and sleeper
pub struct ProfileFetcher<S, P, Z> {
    source: S,
    parser: P,
    sleeper: Z,
    config: FetchConfig,
}

impl<S, P, Z> ProfileFetcher<S, P, Z>
where
    S: PageSource,
    P: PageParser,
    Z: Sleeper,
{
    /// Create a fetcher; fails if the configuration is unusable.
    pub fn new(source: S, parser: P, sleeper: Z, config: FetchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            parser,
            sleeper,
            config,
        })
    }

    /// Fetch the profile page, then the full publication list.
    ///
    /// Failure of the profile page is an error. Failure of the publication walk is not:
    /// the record comes back with an empty list and a failed count.
    pub async fn fetch_profile(&self, id: &ProfileId) -> Result<ProfileRecord> {
        let url = self.config.profile_url(id)?;
        info!(user = %id, "Fetching profile");

        let html = self.get_with_retry(&url).await?;
        self.dump_page(&format!("{}_profile.html", id), &html);

        let metadata = self.parser.parse_profile_page(&html)?;

        let publications = self.fetch_publications(id).await;
        if let Err(e) = &publications {
            error!(user = %id, error = %e, "Failed to fetch publications data");
        }

        let record = ProfileRecord::assemble(metadata, publications);
        info!(user = %id, publications = %record.publication_count, "Profile complete");
        Ok(record)
    }

    /// Walk every publication page for `id`.
    pub async fn fetch_publications(&self, id: &ProfileId) -> Result<Vec<PublicationRecord>> {
        let page_size = self.config.page_size;
        let mut publications = Vec::new();
        let mut cstart = 0;

        loop {
            let url = self.config.publications_url(id, cstart)?;
            debug!(user = %id, cstart, "Fetching publication page");

            let html = self.get_with_retry(&url).await?;
            self.dump_page(&format!("{}_publications_{}.html", id, cstart), &html);

            let page = self.parser.parse_publication_page(&html)?;
            info!(user = %id, cstart, rows = page.rows_seen, "Parsed publication page");
            publications.extend(page.records);

            if page.rows_seen < page_size {
                info!(user = %id, total = publications.len(), "Publication list exhausted");
                return Ok(publications);
            }

            cstart += page_size;
        }
    }

    /// GET one page, retrying the same URL on 429 up to the attempt ceiling.
    async fn get_with_retry(&self, url: &Url) -> Result<String> {
        let max_attempts = self.config.max_attempts;
        let mut state = FetchState::Requesting { attempt: 1 };

        loop {
            state = match state {
                FetchState::Requesting { attempt } => {
                    let response = self.source.get(url).await?;
                    debug!(url = %url, attempt, status = response.status.as_u16(), "HTTP status");
                    match response.status {
                        StatusCode::OK => FetchState::Success(response.body),
                        StatusCode::TOO_MANY_REQUESTS => FetchState::RateLimited { attempt },
                        status => FetchState::HardFailure(ScholarError::HardFailure {
                            status: status.as_u16(),
                            url: url.to_string(),
                        }),
                    }
                }
                FetchState::RateLimited { attempt } if attempt >= max_attempts => {
                    warn!(url = %url, attempts = attempt, "Exceeded maximum retries");
                    FetchState::HardFailure(ScholarError::RetriesExhausted {
                        attempts: attempt,
                        url: url.to_string(),
                    })
                }
                FetchState::RateLimited { attempt } => {
                    let delay = self.config.rate_limit_delay;
                    warn!(
                        url = %url,
                        attempt,
                        wait_secs = delay.as_secs(),
                        "Rate limited, waiting"
                    );
                    self.sleeper.sleep(delay).await;
                    FetchState::Requesting {
                        attempt: attempt + 1,
                    }
                }
                FetchState::Success(body) => return Ok(body),
                FetchState::HardFailure(e) => return Err(e),
            };
        }
    }

    /// Save a raw page body when HTML dumping is enabled.
    fn dump_page(&self, file_name: &str, html: &str) {
        let Some(dir) = self.config.dump_html_dir.as_deref() else {
            return;
        };
        if let Err(e) = write_dump(dir, file_name, html) {
            warn!(error = %e, "Failed to write debug HTML");
        } else {
            debug!(path = %dir.join(file_name).display(), "Debug HTML saved");
        }
    }
}

fn write_dump(dir: &Path, file_name: &str, html: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(file_name), html)
}
