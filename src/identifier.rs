//! Profile identifier extraction.
//!
//! A profile is selected by the `user` query parameter of a citations URL, e.g.
//! `https://scholar.google.com/citations?user=dnbO4DgAAAAJ&hl=en`. Users may also paste
//! the bare identifier, which is accepted as-is.

use crate::error::{Result, ScholarError};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Query parameter carrying the profile identifier.
const USER_PARAM: &str = "user";

/// Opaque token selecting a Google Scholar profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Wrap a raw identifier without validation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the profile identifier from a URL or a bare identifier.
///
/// Inputs without a URL scheme are returned trimmed and otherwise untouched.
/// URLs yield the first `user` query parameter, or `None` when it is absent or empty.
pub fn extract_identifier(input: &str) -> Option<ProfileId> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if !has_url_scheme(input) {
        return Some(ProfileId::new(input));
    }

    let url = Url::parse(input).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == USER_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .map(ProfileId::new)
}

/// Like [`extract_identifier`], reporting a missing identifier as an error.
pub fn parse_identifier(input: &str) -> Result<ProfileId> {
    extract_identifier(input).ok_or_else(|| ScholarError::UnparseableIdentifier(input.trim().to_string()))
}

/// Split a free-text field into its comma-separated entries, dropping blanks.
pub fn split_inputs(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// `scheme://` prefix per RFC 3986: a letter followed by letters, digits, `+`, `-` or `.`.
fn has_url_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'),
        _ => false,
    }
}
