//! Multi-profile processing.
//!
//! The input field holds comma-separated URLs or identifiers. Each entry is processed to
//! completion before the next one starts, and a failure in one entry never stops the rest.

use crate::error::ScholarError;
use crate::export;
use crate::fetcher::ProfileFetcher;
use crate::identifier::{parse_identifier, split_inputs, ProfileId};
use crate::parser::PageParser;
use crate::profile::ProfileRecord;
use crate::source::{PageSource, Sleeper};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Result for one entry of the input
#[derive(Debug)]
pub enum BatchOutcome {
    /// Profile fetched and written to `path`
    Saved {
        id: ProfileId,
        profile: ProfileRecord,
        path: PathBuf,
    },
    /// Entry yielded no identifier
    Unparseable { input: String, error: ScholarError },
    /// Fetching or writing failed for this identifier
    Failed { id: ProfileId, error: ScholarError },
}

impl BatchOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, BatchOutcome::Saved { .. })
    }
}

/// Fetch and save every profile named in `raw`, in input order.
pub async fn run_batch<S, P, Z>(
    fetcher: &ProfileFetcher<S, P, Z>,
    raw: &str,
    output_dir: &Path,
) -> Vec<BatchOutcome>
where
    S: PageSource,
    P: PageParser,
    Z: Sleeper,
{
    let entries = split_inputs(raw);
    info!(count = entries.len(), "Processing profiles");

    let mut outcomes = Vec::with_capacity(entries.len());
    let mut written = HashMap::new();
    for entry in entries {
        let outcome = process_entry(fetcher, entry, output_dir, &mut written).await;
        outcomes.push(outcome);
    }

    let saved = outcomes.iter().filter(|o| o.is_saved()).count();
    info!(saved, total = outcomes.len(), "All profile(s) processed");
    outcomes
}

async fn process_entry<S, P, Z>(
    fetcher: &ProfileFetcher<S, P, Z>,
    entry: &str,
    output_dir: &Path,
    written: &mut HashMap<String, ProfileId>,
) -> BatchOutcome
where
    S: PageSource,
    P: PageParser,
    Z: Sleeper,
{
    let id = match parse_identifier(entry) {
        Ok(id) => id,
        Err(error) => {
            warn!(input = entry, "Could not parse user ID");
            return BatchOutcome::Unparseable {
                input: entry.to_string(),
                error,
            };
        }
    };

    let profile = match fetcher.fetch_profile(&id).await {
        Ok(profile) => profile,
        Err(error) => {
            error!(user = %id, error = %error, "Failed to fetch profile data");
            return BatchOutcome::Failed { id, error };
        }
    };

    let file_name = claim_file_name(&id, written);
    match export::save_profile_as(&profile, &file_name, output_dir) {
        Ok(path) => BatchOutcome::Saved { id, profile, path },
        Err(error) => {
            error!(user = %id, error = %error, "Failed to save profile");
            BatchOutcome::Failed { id, error }
        }
    }
}

/// File name for `id`, numbered when a different identifier of this run already took it.
fn claim_file_name(id: &ProfileId, written: &mut HashMap<String, ProfileId>) -> String {
    let mut file_name = export::profile_file_name(id);
    let mut n = 1;
    while let Some(owner) = written.get(&file_name) {
        if owner == id {
            break;
        }
        n += 1;
        file_name = export::numbered_file_name(id, n);
    }
    if n > 1 {
        warn!(user = %id, file = %file_name, "File name already used by another profile");
    }
    written.insert(file_name.clone(), id.clone());
    file_name
}
