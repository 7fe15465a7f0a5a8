//! # gscholar-profile
//!
//! Google Scholar profile scraper: name, affiliation, interests, citation metrics and the
//! complete publication list of a profile, saved as CSV.
//!
//! ## Modules
//!
//! - [`identifier`] - Profile ID extraction from URLs or bare IDs
//! - [`fetcher`] - Paginated fetch loop with rate-limit retry
//! - [`parser`] - Profile/publication page parsing
//! - [`source`] - HTTP transport and sleep seams
//! - [`export`] - CSV output
//! - [`batch`] - Comma-separated multi-profile runs
//! - [`cookies`] - Cookie persistence
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gscholar_profile::{
//!     extract_identifier, FetchConfig, ProfileFetcher, ReqwestPageSource, ScholarPageParser,
//!     TokioSleeper,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = FetchConfig::default();
//!     let source = ReqwestPageSource::new(&config, &[])?;
//!     let fetcher = ProfileFetcher::new(source, ScholarPageParser::default(), TokioSleeper, config)?;
//!
//!     let id = extract_identifier("https://scholar.google.com/citations?user=dnbO4DgAAAAJ&hl=en")
//!         .ok_or_else(|| anyhow::anyhow!("no user id"))?;
//!     let profile = fetcher.fetch_profile(&id).await?;
//!     println!("{} publications", profile.publication_count);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod config;
pub mod cookies;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod identifier;
pub mod parser;
pub mod profile;
pub mod source;

pub use config::FetchConfig;
pub use error::{Result, ScholarError};
pub use fetcher::ProfileFetcher;
pub use identifier::{extract_identifier, ProfileId};
pub use parser::{MalformedRowPolicy, PageParser, ScholarPageParser};
pub use profile::{ProfileRecord, PublicationCount, PublicationRecord};
pub use source::{PageSource, ReqwestPageSource, Sleeper, TokioSleeper};
