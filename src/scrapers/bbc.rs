//! BBC landing page extractor (SourceB).
//!
//! The home page renders stories as cards in two layouts, `dundee-card` and
//! `manchester-card`, that share one inner schema. Both layouts are collected:
//! all dundee cards first, then all manchester cards.
//!
//! The internal link is the card's identity. Cards without one are promos or
//! live widgets and are skipped. Title and description are cosmetic, so a
//! missing one is replaced by a fixed placeholder instead of dropping the card.

use super::{BlockOutcome, SiteExtractor};
use crate::error::ParseStructureError;
use crate::models::{RawArticle, SourceKind};
use crate::utils::element_text;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const NO_HEADLINE: &str = "No headline available";
pub const NO_DESCRIPTION: &str = "No description available";

static DUNDEE_CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[data-testid="dundee-card"]"#).unwrap());
static MANCHESTER_CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[data-testid="manchester-card"]"#).unwrap());
static INTERNAL_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[data-testid="internal-link"]"#).unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"p[data-testid="card-description"]"#).unwrap());

#[derive(Debug, Clone)]
pub struct BbcExtractor {
    /// Origin that relative card links are resolved against.
    base: Url,
}

impl BbcExtractor {
    /// Build an extractor for the page at `page_url`.
    ///
    /// # Arguments
    ///
    /// * `page_url` - Absolute URL of the landing page. Only its origin is
    ///   kept; relative card links resolve against it.
    ///
    /// # Errors
    ///
    /// Returns [`url::ParseError`] when `page_url` is not an absolute URL.
    pub fn new(page_url: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(page_url)?;
        base.set_path("/");
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    /// Apply the card rules to the `index`-th card of the page.
    fn card(&self, index: usize, card: ElementRef<'_>) -> BlockOutcome {
        let Some(link) = card.select(&INTERNAL_LINK).next() else {
            return BlockOutcome::Ignored;
        };

        let link = link
            .value()
            .attr("href")
            .and_then(|href| self.base.join(href.trim()).ok());
        let Some(link) = link else {
            return BlockOutcome::Malformed(ParseStructureError {
                source_name: SourceKind::Bbc.name(),
                block: index,
                missing: "resolvable internal-link href",
            });
        };

        let title = card
            .select(&HEADING)
            .next()
            .map(element_text)
            .unwrap_or_else(|| NO_HEADLINE.to_string());
        let description = card
            .select(&DESCRIPTION)
            .next()
            .map(element_text)
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        BlockOutcome::Article(RawArticle::new(title, link.as_str(), description))
    }
}

impl SiteExtractor for BbcExtractor {
    fn source(&self) -> SourceKind {
        SourceKind::Bbc
    }

    fn blocks(&self, doc: &Html) -> Vec<BlockOutcome> {
        doc.select(&DUNDEE_CARD)
            .chain(doc.select(&MANCHESTER_CARD))
            .enumerate()
            .map(|(i, card)| self.card(i, card))
            .collect()
    }
}
