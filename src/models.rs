//! Data models passed between pipeline stages.
//!
//! - [`RawArticle`]: a record as extracted from a landing page
//! - [`CleanedArticle`]: a record that passed the completeness filter
//! - [`ArticleBatch`]: the unit handed from one stage to the next
//!
//! Nothing here survives a run; the dataset file written by
//! [`crate::outputs::dataset`] is the only durable artifact.

use std::fmt;

/// Which landing page a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Single-page site organised in `<article>` story blocks.
    Dawn,
    /// Card-grid site with two card layouts sharing one schema.
    Bbc,
}

impl SourceKind {
    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Dawn => "dawn",
            SourceKind::Bbc => "bbc",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An extracted article before the completeness filter.
///
/// An empty `description` means the page had no excerpt for this story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    /// Headline text.
    pub title: String,
    /// Absolute URL of the story.
    pub link: String,
    /// Excerpt text, possibly empty.
    pub description: String,
}

impl RawArticle {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
        }
    }
}

/// An article guaranteed to carry a non-empty description.
///
/// The only way to build one is [`CleanedArticle::admit`], so the guarantee
/// holds for every value of this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedArticle(RawArticle);

impl CleanedArticle {
    /// Admit a raw record, or hand it back when its description is empty.
    pub fn admit(raw: RawArticle) -> Result<Self, RawArticle> {
        if raw.description.is_empty() {
            Err(raw)
        } else {
            Ok(Self(raw))
        }
    }

    pub fn title(&self) -> &str {
        &self.0.title
    }

    pub fn link(&self) -> &str {
        &self.0.link
    }

    pub fn description(&self) -> &str {
        &self.0.description
    }

    /// Fields in dataset column order: title, link, description.
    pub fn as_row(&self) -> [&str; 3] {
        [self.title(), self.link(), self.description()]
    }

    pub fn into_raw(self) -> RawArticle {
        self.0
    }
}

impl From<CleanedArticle> for RawArticle {
    fn from(article: CleanedArticle) -> Self {
        article.into_raw()
    }
}

impl AsRef<RawArticle> for CleanedArticle {
    fn as_ref(&self) -> &RawArticle {
        &self.0
    }
}

/// Records handed from one stage to the next within a single run.
pub type ArticleBatch<T> = Vec<T>;
