//! Site-specific extraction rules.
//!
//! Each source gets a [`SiteExtractor`] that turns a parsed landing page into
//! [`RawArticle`]s. The two sources disagree on what makes a block worth
//! keeping, and that disagreement is deliberate:
//!
//! | Source | Module | Container | Gate | Missing title | Missing excerpt |
//! |--------|--------|-----------|------|---------------|-----------------|
//! | Dawn | [`dawn`] | `<article>` | title | block skipped | `""` |
//! | BBC | [`bbc`] | dundee + manchester cards | internal link | placeholder | placeholder |
//!
//! Blocks that match a container but lack a mandatory element produce a
//! [`ParseStructureError`]; it is logged and counted, and only that record
//! is lost.

use crate::error::ParseStructureError;
use crate::models::{RawArticle, SourceKind};
use scraper::Html;
use tracing::{info, warn};

pub mod bbc;
pub mod dawn;

pub use bbc::BbcExtractor;
pub use dawn::DawnExtractor;

/// Outcome of inspecting one container block.
#[derive(Debug, PartialEq, Eq)]
pub enum BlockOutcome {
    Article(RawArticle),
    /// Not a content block under this source's rules.
    Ignored,
    Malformed(ParseStructureError),
}

/// Extraction rules for one landing page layout.
pub trait SiteExtractor {
    fn source(&self) -> SourceKind;

    /// Inspect every container block of the page, in document order.
    ///
    /// # Arguments
    ///
    /// * `doc` - Parsed landing page.
    ///
    /// # Returns
    ///
    /// One [`BlockOutcome`] per container block. The block index carried by a
    /// [`BlockOutcome::Malformed`] is its position in this vector.
    fn blocks(&self, doc: &Html) -> Vec<BlockOutcome>;

    /// Extract the admissible records of a page, logging malformed blocks.
    ///
    /// # Arguments
    ///
    /// * `doc` - Parsed landing page.
    ///
    /// # Returns
    ///
    /// An [`Extraction`] with the records in document order, the number of
    /// ignored blocks and the structure errors of malformed ones. Never fails:
    /// a page with no matching blocks yields an empty extraction.
    fn extract(&self, doc: &Html) -> Extraction {
        let source = self.source();
        let mut extraction = Extraction::default();

        for outcome in self.blocks(doc) {
            match outcome {
                BlockOutcome::Article(article) => extraction.articles.push(article),
                BlockOutcome::Ignored => extraction.ignored += 1,
                BlockOutcome::Malformed(e) => {
                    warn!(%source, error = %e, "Skipping malformed block");
                    extraction.malformed.push(e);
                }
            }
        }

        info!(
            %source,
            extracted = extraction.articles.len(),
            ignored = extraction.ignored,
            malformed = extraction.malformed.len(),
            "Extracted articles"
        );
        extraction
    }
}

/// Records extracted from one page, plus what was left behind.
#[derive(Debug, Default)]
pub struct Extraction {
    pub articles: Vec<RawArticle>,
    pub ignored: usize,
    pub malformed: Vec<ParseStructureError>,
}

/// Per-source figures for a run, logged by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: SourceKind,
    pub url: String,
    pub fetched: bool,
    pub extracted: usize,
    pub skipped: usize,
}
