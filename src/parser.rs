//! Google Scholar profile page parsing.
//!
//! The page format is isolated behind [`PageParser`] so the fetch loop never touches
//! selectors. [`ScholarPageParser`] reads the fixed structural positions of the
//! citations page:
//!
//! - profile: `#gsc_prf_in` (name), `.gsc_prf_il` (affiliation), `a.gsc_prf_inta`
//!   (interests), `td.gsc_rsb_std` (six metric cells)
//! - publications: one `tr.gsc_a_tr` per row with `a.gsc_a_at`, two `div.gs_gray`,
//!   `a.gsc_a_ac` and `span.gsc_a_h`

use crate::error::{Result, ScholarError};
use crate::profile::{CitationMetrics, ProfileMetadata, PublicationRecord};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

/// Elements that only the CAPTCHA interstitial carries
const CAPTCHA_SELECTOR: &str = "#gs_captcha_f, #gs_captcha_ccl, .gs_captcha_ccl";

/// Interstitial wording, trusted only on pages without profile or publication markup
const CAPTCHA_PHRASES: &[&str] = &["Solving the above CAPTCHA", "unusual traffic"];

/// Markup present on every real citations page
const CITATIONS_PAGE_SELECTOR: &str = "#gsc_prf_in, tr.gsc_a_tr, #gsc_a_b";

/// Rows extracted from one publication page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicationPage {
    pub records: Vec<PublicationRecord>,
    /// Rows present in the markup, including any skipped as malformed
    pub rows_seen: usize,
}

/// Capability to turn page bodies into records.
pub trait PageParser: Send + Sync {
    /// Extract profile fields; absent fields are left empty.
    fn parse_profile_page(&self, html: &str) -> Result<ProfileMetadata>;

    /// Extract every publication row on the page.
    fn parse_publication_page(&self, html: &str) -> Result<PublicationPage>;
}

/// What to do with a publication row missing one of its cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedRowPolicy {
    /// Fail the whole page
    #[default]
    Abort,
    /// Drop the row with a warning
    Skip,
}

/// Parser for the live Google Scholar markup
#[derive(Debug, Clone, Default)]
pub struct ScholarPageParser {
    malformed_rows: MalformedRowPolicy,
}

impl ScholarPageParser {
    pub fn new(malformed_rows: MalformedRowPolicy) -> Self {
        Self { malformed_rows }
    }
}

struct RowSelectors {
    title: Selector,
    gray: Selector,
    citations: Selector,
    year: Selector,
}

impl RowSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            title: selector("a.gsc_a_at")?,
            gray: selector("div.gs_gray")?,
            citations: selector("a.gsc_a_ac")?,
            year: selector("span.gsc_a_h")?,
        })
    }
}

impl PageParser for ScholarPageParser {
    fn parse_profile_page(&self, html: &str) -> Result<ProfileMetadata> {
        let document = Html::parse_document(html);
        check_captcha(&document)?;

        let name_selector = selector("div#gsc_prf_in")?;
        let affiliation_selector = selector("div.gsc_prf_il")?;
        let interest_selector = selector("a.gsc_prf_inta")?;
        let metric_selector = selector("td.gsc_rsb_std")?;

        let mut metadata = ProfileMetadata::default();

        match document.select(&name_selector).next() {
            Some(el) => metadata.name = Some(text_of(el)),
            None => warn!("Failed to find name div"),
        }

        match document.select(&affiliation_selector).next() {
            Some(el) => metadata.affiliation = Some(text_of(el)),
            None => warn!("Failed to find affiliation div"),
        }

        metadata.interests = document.select(&interest_selector).map(text_of).collect();
        if metadata.interests.is_empty() {
            warn!("Failed to find interests");
        }

        let cells: Vec<String> = document.select(&metric_selector).map(text_of).collect();
        metadata.metrics = CitationMetrics::from_cells(&cells);
        if metadata.metrics.is_none() {
            warn!(cells = cells.len(), "Failed to find metrics");
        }

        Ok(metadata)
    }

    fn parse_publication_page(&self, html: &str) -> Result<PublicationPage> {
        let document = Html::parse_document(html);
        check_captcha(&document)?;

        let row_selector = selector("tr.gsc_a_tr")?;
        let cells = RowSelectors::new()?;

        let mut page = PublicationPage::default();

        for (index, row) in document.select(&row_selector).enumerate() {
            page.rows_seen += 1;
            match parse_row(row, index, &cells) {
                Ok(record) => page.records.push(record),
                Err(e) if self.malformed_rows == MalformedRowPolicy::Skip => {
                    warn!(row = index, error = %e, "Skipping malformed publication row");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(rows = page.rows_seen, kept = page.records.len(), "Parsed publication page");
        Ok(page)
    }
}

fn parse_row(row: ElementRef<'_>, index: usize, cells: &RowSelectors) -> Result<PublicationRecord> {
    let missing = |field| ScholarError::MissingField { field, row: index };

    let title = row.select(&cells.title).next().ok_or_else(|| missing("title"))?;
    let mut gray = row.select(&cells.gray);
    let authors = gray.next().ok_or_else(|| missing("authors"))?;
    let venue = gray.next().ok_or_else(|| missing("venue"))?;
    let citations = row
        .select(&cells.citations)
        .next()
        .ok_or_else(|| missing("citations"))?;
    let year = row.select(&cells.year).next().ok_or_else(|| missing("year"))?;

    Ok(PublicationRecord {
        title: raw_text(title),
        authors: raw_text(authors),
        venue: raw_text(venue),
        citation_count: raw_text(citations),
        year: raw_text(year),
    })
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScholarError::Parse(e.to_string()))
}

/// Element text exactly as rendered, no trimming.
fn raw_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Element text with surrounding whitespace removed, for profile header fields.
fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Titles and interests are user text, so the wording alone never condemns a citations page.
fn check_captcha(document: &Html) -> Result<()> {
    let captcha_form = document.select(&selector(CAPTCHA_SELECTOR)?).next().is_some();
    let is_citations_page = document
        .select(&selector(CITATIONS_PAGE_SELECTOR)?)
        .next()
        .is_some();
    let wording = !is_citations_page && {
        let text: String = document.root_element().text().collect();
        CAPTCHA_PHRASES.iter().any(|phrase| text.contains(phrase))
    };

    if captcha_form || wording {
        warn!("CAPTCHA detected");
        return Err(ScholarError::Captcha);
    }
    Ok(())
}
