//! Custom error types for gscholar-profile.
//!
//! All library functions return `Result<T, ScholarError>` instead of using `unwrap()`.
//! Rate limiting is not an error here: it is a retry state inside the fetcher and only
//! becomes [`ScholarError::RetriesExhausted`] once the attempt ceiling is reached.

use thiserror::Error;

/// Main error type for gscholar-profile operations.
#[derive(Debug, Error)]
pub enum ScholarError {
    /// Input yielded no profile identifier
    #[error("Could not parse user ID from input: {0}")]
    UnparseableIdentifier(String),

    /// Attempt ceiling reached while the server kept answering 429
    #[error("Exceeded maximum retries ({attempts}) while fetching {url}")]
    RetriesExhausted {
        /// Number of requests issued for the page
        attempts: u32,
        /// Page that was being fetched
        url: String,
    },

    /// Unexpected HTTP status (anything but 200 or 429)
    #[error("HTTP {status} while fetching {url}")]
    HardFailure {
        /// Status code returned by the server
        status: u16,
        /// Page that was being fetched
        url: String,
    },

    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTML parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// A publication row lacks one of its fixed cells
    #[error("Publication row {row} has no {field} cell")]
    MissingField {
        /// Name of the missing field
        field: &'static str,
        /// Zero-based row index within the page
        row: usize,
    },

    /// CAPTCHA interstitial served instead of the page
    #[error("CAPTCHA detected, please refresh cookies")]
    Captcha,

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

impl ScholarError {
    /// Whether the failure came from the retry ceiling rather than a plain HTTP error.
    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, ScholarError::RetriesExhausted { .. })
    }
}

/// Result type alias using `ScholarError`
pub type Result<T> = std::result::Result<T, ScholarError>;
