//! Dawn landing page extractor (SourceA).
//!
//! The front page lists stories as `<article>` blocks:
//!
//! ```html
//! <article class="story">
//!   <h2 class="story__title"><a class="story__link" href="https://www.dawn.com/news/1">…</a></h2>
//!   <div class="story__excerpt">…</div>
//! </article>
//! ```
//!
//! A title marks a genuine story. Blocks without one are layout filler and
//! are dropped. A missing excerpt is kept as an empty description, which the
//! cleaner filters later.

use super::{BlockOutcome, SiteExtractor};
use crate::error::ParseStructureError;
use crate::models::{RawArticle, SourceKind};
use crate::utils::element_text;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse(".story__title").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse(".story__link").unwrap());
static EXCERPT: Lazy<Selector> = Lazy::new(|| Selector::parse(".story__excerpt").unwrap());

/// Stateless: story links on this site are already absolute.
#[derive(Debug, Default, Clone, Copy)]
pub struct DawnExtractor;

impl DawnExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Apply the story rules to one `<article>` block.
    ///
    /// # Arguments
    ///
    /// * `index` - Position of the block among the page's `<article>` elements.
    /// * `block` - The `<article>` element.
    ///
    /// # Returns
    ///
    /// [`BlockOutcome::Ignored`] without a title, [`BlockOutcome::Malformed`]
    /// for a title without a link `href`, otherwise the article.
    fn block(&self, index: usize, block: ElementRef<'_>) -> BlockOutcome {
        let Some(title) = block.select(&TITLE).next() else {
            return BlockOutcome::Ignored;
        };

        let href = block
            .select(&LINK)
            .next()
            .and_then(|link| link.value().attr("href"));
        let Some(href) = href else {
            return BlockOutcome::Malformed(ParseStructureError {
                source_name: SourceKind::Dawn.name(),
                block: index,
                missing: "story__link href",
            });
        };

        let description = block
            .select(&EXCERPT)
            .next()
            .map(element_text)
            .unwrap_or_default();

        BlockOutcome::Article(RawArticle::new(
            element_text(title),
            href.trim(),
            description,
        ))
    }
}

impl SiteExtractor for DawnExtractor {
    fn source(&self) -> SourceKind {
        SourceKind::Dawn
    }

    fn blocks(&self, doc: &Html) -> Vec<BlockOutcome> {
        doc.select(&ARTICLE)
            .enumerate()
            .map(|(i, block)| self.block(i, block))
            .collect()
    }
}
