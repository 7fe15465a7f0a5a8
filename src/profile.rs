//! Profile and publication records.
//!
//! Every scraped value is kept as the raw page text. Citation counts and years stay strings
//! so empty cells survive unchanged into the CSV output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker written in place of the publication count when the list could not be fetched
pub const PUBLICATION_COUNT_FAILED: &str = "Failed to count publications";

/// One row of a profile's publication table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PublicationRecord {
    /// Article title
    pub title: String,
    /// Author list as displayed
    pub authors: String,
    /// Journal/Conference venue line
    pub venue: String,
    /// "Cited by" count, empty when never cited
    pub citation_count: String,
    /// Publication year, empty when unknown
    pub year: String,
}

/// An all-time / recent-window value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MetricPair {
    pub all_time: String,
    pub recent: String,
}

/// The three metric pairs from the profile's citation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CitationMetrics {
    pub citations: MetricPair,
    pub h_index: MetricPair,
    pub i10_index: MetricPair,
}

impl CitationMetrics {
    /// Build from the six metric cells in page order.
    ///
    /// The cells are read as one group: fewer than six yields `None`.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        let [c_all, c_recent, h_all, h_recent, i_all, i_recent] = cells.get(..6)? else {
            return None;
        };
        let pair = |all: &String, recent: &String| MetricPair {
            all_time: all.clone(),
            recent: recent.clone(),
        };
        Some(Self {
            citations: pair(c_all, c_recent),
            h_index: pair(h_all, h_recent),
            i10_index: pair(i_all, i_recent),
        })
    }
}

/// Publication count, or the marker left when the publication list failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationCount {
    Counted(usize),
    /// The list could not be fetched; carries the failure description
    Failed(String),
}

impl PublicationCount {
    pub fn is_failed(&self) -> bool {
        matches!(self, PublicationCount::Failed(_))
    }
}

impl fmt::Display for PublicationCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicationCount::Counted(n) => write!(f, "{}", n),
            PublicationCount::Failed(_) => f.write_str(PUBLICATION_COUNT_FAILED),
        }
    }
}

/// Fields read from the profile page itself. Each is optional on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileMetadata {
    pub name: Option<String>,
    pub affiliation: Option<String>,
    pub interests: Vec<String>,
    pub metrics: Option<CitationMetrics>,
}

/// A fully assembled profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: Option<String>,
    pub affiliation: Option<String>,
    pub interests: Vec<String>,
    pub metrics: Option<CitationMetrics>,
    pub publication_count: PublicationCount,
    pub publications: Vec<PublicationRecord>,
}

impl ProfileRecord {
    /// Merge page metadata with the outcome of the publication walk.
    ///
    /// On failure the list is left empty and the count carries the failure marker,
    /// otherwise the count is the list length.
    pub fn assemble<E: fmt::Display>(
        metadata: ProfileMetadata,
        publications: std::result::Result<Vec<PublicationRecord>, E>,
    ) -> Self {
        let (publication_count, publications) = match publications {
            Ok(list) => (PublicationCount::Counted(list.len()), list),
            Err(e) => (PublicationCount::Failed(e.to_string()), Vec::new()),
        };
        Self {
            name: metadata.name,
            affiliation: metadata.affiliation,
            interests: metadata.interests,
            metrics: metadata.metrics,
            publication_count,
            publications,
        }
    }
}
