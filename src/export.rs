//! Tabular (CSV) output.
//!
//! One file per profile. Layout:
//!
//! ```text
//! Name,<name>
//! Affiliation,<affiliation>
//! Interests,<interest>,<interest>,...
//! Citations (All),<n>          (and Recent, h-index, i10-index)
//! <blank>
//! Title,Authors,Journal,Citations,Year
//! <one row per publication>
//! ```

use crate::error::Result;
use crate::identifier::ProfileId;
use crate::profile::{MetricPair, ProfileRecord, PublicationRecord};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default output directory, created on demand
pub const OUTPUT_DIR: &str = "google-scholar-search-results";

/// Header row preceding the publication rows
pub const PUBLICATION_HEADER: [&str; 5] = ["Title", "Authors", "Journal", "Citations", "Year"];

/// Create the output directory if needed and return it.
pub fn ensure_output_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}

/// `scholar_profile_<id>.csv`, with anything outside `[A-Za-z0-9_-]` replaced by `_`.
pub fn profile_file_name(id: &ProfileId) -> String {
    let safe_id: String = id
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("scholar_profile_{}.csv", safe_id)
}

/// `scholar_profile_<id>_<n>.csv`, used when two identifiers sanitize to the same name.
pub fn numbered_file_name(id: &ProfileId, n: usize) -> String {
    let name = profile_file_name(id);
    let stem = name.trim_end_matches(".csv");
    format!("{}_{}.csv", stem, n)
}

/// Write the profile to `<dir>/scholar_profile_<id>.csv`, creating `dir` if missing.
pub fn save_profile(profile: &ProfileRecord, id: &ProfileId, dir: &Path) -> Result<PathBuf> {
    save_profile_as(profile, &profile_file_name(id), dir)
}

/// Write the profile to `<dir>/<file_name>`, creating `dir` if missing.
pub fn save_profile_as(profile: &ProfileRecord, file_name: &str, dir: &Path) -> Result<PathBuf> {
    let dir = ensure_output_dir(dir)?;
    let path = dir.join(file_name);
    let file = File::create(&path)?;
    write_profile(profile, file)?;
    info!(path = %path.display(), rows = profile.publications.len(), "Saved profile CSV");
    Ok(path)
}

/// Serialize a profile in the label/value + publication table layout.
pub fn write_profile<W: Write>(profile: &ProfileRecord, writer: W) -> Result<()> {
    let mut builder = csv::WriterBuilder::new();
    builder.has_headers(false).flexible(true);
    let mut wtr = builder.from_writer(writer);

    wtr.write_record(["Name", profile.name.as_deref().unwrap_or_default()])?;
    wtr.write_record(["Affiliation", profile.affiliation.as_deref().unwrap_or_default()])?;

    let mut interests = vec!["Interests"];
    interests.extend(profile.interests.iter().map(String::as_str));
    wtr.write_record(&interests)?;

    let metrics = profile.metrics.as_ref();
    let rows: [(&str, Option<&MetricPair>); 3] = [
        ("Citations", metrics.map(|m| &m.citations)),
        ("h-index", metrics.map(|m| &m.h_index)),
        ("i10-index", metrics.map(|m| &m.i10_index)),
    ];
    for (label, pair) in rows {
        let all = pair.map(|p| p.all_time.as_str()).unwrap_or_default();
        let recent = pair.map(|p| p.recent.as_str()).unwrap_or_default();
        wtr.write_record([format!("{} (All)", label).as_str(), all])?;
        wtr.write_record([format!("{} (Recent)", label).as_str(), recent])?;
    }

    // An empty line; a record with one empty field would be written as `""`
    wtr.flush()?;
    let mut inner = wtr.into_inner().map_err(|e| e.into_error())?;
    inner.write_all(b"\n")?;
    let mut wtr = builder.from_writer(inner);
    wtr.write_record(PUBLICATION_HEADER)?;

    for publication in &profile.publications {
        wtr.write_record([
            publication.title.as_str(),
            publication.authors.as_str(),
            publication.venue.as_str(),
            publication.citation_count.as_str(),
            publication.year.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read back the publication rows that follow the header row.
pub fn read_publications<R: Read>(reader: R) -> Result<Vec<PublicationRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut publications = Vec::new();
    let mut in_table = false;

    for record in rdr.records() {
        let record = record?;
        if !in_table {
            in_table = record.iter().eq(PUBLICATION_HEADER);
            continue;
        }
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        publications.push(PublicationRecord {
            title: field(0),
            authors: field(1),
            venue: field(2),
            citation_count: field(3),
            year: field(4),
        });
    }

    Ok(publications)
}

/// Read the publication rows of a saved profile file.
pub fn load_publications(path: &Path) -> Result<Vec<PublicationRecord>> {
    read_publications(File::open(path)?)
}
