//! The extract and clean stages.
//!
//! Each stage is a plain function from the previous stage's output to its
//! own, so the orchestrator decides how values travel between tasks.

use crate::fetch::PageFetcher;
use crate::models::{ArticleBatch, CleanedArticle, RawArticle};
use crate::scrapers::{SiteExtractor, SourceReport};
use tracing::{debug, info, instrument, warn};

/// Fetch one landing page and run its extractor.
///
/// A fetch failure degrades to an empty batch; the run carries on with the
/// other source.
///
/// # Arguments
///
/// * `fetcher` - Shared HTTP client.
/// * `extractor` - Site rules for the page at `url`.
/// * `url` - Landing page to fetch.
///
/// # Returns
///
/// The extracted records in page order, plus a [`SourceReport`] recording
/// whether the page was fetched and how many blocks were kept or skipped as
/// malformed.
#[instrument(level = "info", skip(fetcher, extractor), fields(source = %extractor.source()))]
pub async fn harvest<E>(
    fetcher: &PageFetcher,
    extractor: &E,
    url: &str,
) -> (ArticleBatch<RawArticle>, SourceReport)
where
    E: SiteExtractor,
{
    let mut report = SourceReport {
        source: extractor.source(),
        url: url.to_string(),
        fetched: false,
        extracted: 0,
        skipped: 0,
    };

    let extraction = match fetcher.fetch(url).await {
        Ok(document) => extractor.extract(&document),
        Err(e) => {
            warn!(error = %e, url = e.url(), "Source unavailable; it contributes no records this run");
            return (Vec::new(), report);
        }
    };

    report.fetched = true;
    report.extracted = extraction.articles.len();
    report.skipped = extraction.malformed.len();
    (extraction.articles, report)
}

/// Run both sources and concatenate their records, SourceA first.
///
/// The two fetch/extract paths share no state and run concurrently.
///
/// # Arguments
///
/// * `fetcher` - Shared HTTP client used by both sources.
/// * `source_a` / `source_a_url` - Story-block extractor and its landing page.
/// * `source_b` / `source_b_url` - Card-grid extractor and its landing page.
///
/// # Returns
///
/// All SourceA records followed by all SourceB records, each in page order,
/// and one [`SourceReport`] per source in the same order.
#[instrument(level = "info", skip(fetcher, source_a, source_b))]
pub async fn aggregate<A, B>(
    fetcher: &PageFetcher,
    source_a: &A,
    source_a_url: &str,
    source_b: &B,
    source_b_url: &str,
) -> (ArticleBatch<RawArticle>, Vec<SourceReport>)
where
    A: SiteExtractor,
    B: SiteExtractor,
{
    let ((mut articles, report_a), (articles_b, report_b)) = futures::join!(
        harvest(fetcher, source_a, source_a_url),
        harvest(fetcher, source_b, source_b_url),
    );
    articles.extend(articles_b);

    info!(
        total = articles.len(),
        source_a = report_a.extracted,
        source_b = report_b.extracted,
        "Aggregated raw articles"
    );
    (articles, vec![report_a, report_b])
}

/// Keep exactly the records with a non-empty description.
///
/// Order is preserved and nothing is merged. Placeholder descriptions from
/// the card-grid source are non-empty and therefore pass.
///
/// # Returns
///
/// The subsequence of `batch` with non-empty descriptions. Running it again on
/// its own output changes nothing.
#[instrument(level = "info", skip_all, fields(input = batch.len()))]
pub fn clean<T>(batch: ArticleBatch<T>) -> ArticleBatch<CleanedArticle>
where
    T: Into<RawArticle>,
{
    let mut dropped = 0usize;
    let cleaned: Vec<CleanedArticle> = batch
        .into_iter()
        .filter_map(|raw| match CleanedArticle::admit(raw.into()) {
            Ok(article) => Some(article),
            Err(rejected) => {
                debug!(title = %rejected.title, link = %rejected.link, "Dropping article without description");
                dropped += 1;
                None
            }
        })
        .collect();

    info!(kept = cleaned.len(), dropped, "Cleaned articles");
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::scrapers::bbc::{NO_DESCRIPTION, NO_HEADLINE};
    use crate::scrapers::{BbcExtractor, DawnExtractor};
    use crate::models::SourceKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DAWN_PAGE: &str = r#"<html><body>
        <article><h2 class="story__title"><a class="story__link" href="https://www.dawn.com/news/1">T1</a></h2></article>
        <article><h2 class="story__title"><a class="story__link" href="https://www.dawn.com/news/2">T2</a></h2>
            <div class="story__excerpt">desc</div></article>
    </body></html>"#;

    const BBC_PAGE: &str = r#"<html><body>
        <div data-testid="dundee-card"><a data-testid="internal-link" href="/news/a"><h2>Card A</h2>
            <p data-testid="card-description">About A</p></a></div>
        <div data-testid="manchester-card"><a data-testid="internal-link" href="/news/b"></a></div>
    </body></html>"#;

    fn fetcher() -> PageFetcher {
        PageFetcher::new(&HttpConfig {
            timeout_secs: 5,
            ..HttpConfig::default()
        })
        .unwrap()
    }

    async fn serve(pages: &[(&str, &str)]) -> MockServer {
        let server = MockServer::start().await;
        for (route, body) in pages {
            Mock::given(method("GET"))
                .and(path(*route))
                .respond_with(ResponseTemplate::new(200).set_body_string(*body))
                .mount(&server)
                .await;
        }
        server
    }

    fn sample() -> Vec<RawArticle> {
        vec![
            RawArticle::new("T1", "http://x/1", ""),
            RawArticle::new("T2", "http://x/2", "desc"),
            RawArticle::new("T3", "http://x/3", ""),
            RawArticle::new("T2", "http://x/2", "desc"),
            RawArticle::new(NO_HEADLINE, "http://x/4", NO_DESCRIPTION),
        ]
    }

    #[test]
    fn test_clean_drops_empty_descriptions() {
        let cleaned = clean(vec![
            RawArticle::new("T1", "http://x/1", ""),
            RawArticle::new("T2", "http://x/2", "desc"),
        ]);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].as_row(), ["T2", "http://x/2", "desc"]);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let once = clean(sample());
        let twice = clean(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_is_an_order_preserving_subset() {
        let input = sample();
        let cleaned = clean(input.clone());
        assert!(cleaned.len() <= input.len());
        assert!(cleaned.iter().all(|c| input.contains(c.as_ref())));

        let links: Vec<_> = cleaned.iter().map(|c| c.link()).collect();
        assert_eq!(links, vec!["http://x/2", "http://x/2", "http://x/4"]);
    }

    #[test]
    fn test_clean_keeps_duplicates() {
        let cleaned = clean(sample());
        assert_eq!(cleaned.iter().filter(|c| c.title() == "T2").count(), 2);
    }

    #[test]
    fn test_placeholder_description_passes_clean() {
        // The card-grid placeholder is non-empty text, unlike a missing excerpt.
        let cleaned = clean(vec![RawArticle::new(
            NO_HEADLINE,
            "https://www.bbc.com/news/b",
            NO_DESCRIPTION,
        )]);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].description(), "No description available");
    }

    #[test]
    fn test_clean_empty_batch() {
        assert!(clean(Vec::<RawArticle>::new()).is_empty());
    }

    #[tokio::test]
    async fn test_aggregate_concatenates_source_a_then_b() {
        let server = serve(&[("/dawn", DAWN_PAGE), ("/bbc", BBC_PAGE)]).await;
        let bbc_url = format!("{}/bbc", server.uri());
        let bbc = BbcExtractor::new(&bbc_url).unwrap();

        let (articles, reports) = aggregate(
            &fetcher(),
            &DawnExtractor::new(),
            &format!("{}/dawn", server.uri()),
            &bbc,
            &bbc_url,
        )
        .await;

        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["T1", "T2", "Card A", NO_HEADLINE]);
        assert_eq!(articles[3].link, format!("{}/news/b", server.uri()));
        assert_eq!(articles[3].description, NO_DESCRIPTION);
        assert_eq!(reports[0].source, SourceKind::Dawn);
        assert_eq!(reports[1].extracted, 2);

        // T1 has no excerpt; the placeholder card survives.
        let cleaned = clean(articles);
        let titles: Vec<_> = cleaned.iter().map(|a| a.title()).collect();
        assert_eq!(titles, vec!["T2", "Card A", NO_HEADLINE]);
    }

    #[tokio::test]
    async fn test_aggregate_counts_malformed_blocks_as_skipped() {
        let dawn_page = r#"<html><body>
            <article><h2 class="story__title"><a class="story__link" href="https://www.dawn.com/news/1">T1</a></h2>
                <div class="story__excerpt">one</div></article>
            <article><h2 class="story__title">No link here</h2>
                <div class="story__excerpt">lost</div></article>
            <article><h2 class="story__title"><a class="story__link" href="https://www.dawn.com/news/3">T3</a></h2>
                <div class="story__excerpt">three</div></article>
        </body></html>"#;
        let server = serve(&[("/dawn", dawn_page), ("/bbc", BBC_PAGE)]).await;
        let bbc_url = format!("{}/bbc", server.uri());
        let bbc = BbcExtractor::new(&bbc_url).unwrap();

        let (articles, reports) = aggregate(
            &fetcher(),
            &DawnExtractor::new(),
            &format!("{}/dawn", server.uri()),
            &bbc,
            &bbc_url,
        )
        .await;

        assert!(reports[0].fetched);
        assert_eq!(reports[0].skipped, 1);
        assert_eq!(reports[0].extracted, 2);
        assert_eq!(reports[1].skipped, 0);

        let rows: Vec<_> = articles
            .iter()
            .map(|a| (a.title.as_str(), a.link.as_str(), a.description.as_str()))
            .collect();
        assert_eq!(
            rows[..2],
            [
                ("T1", "https://www.dawn.com/news/1", "one"),
                ("T3", "https://www.dawn.com/news/3", "three"),
            ]
        );
        assert_eq!(articles.len(), 4);
        assert_eq!(articles[2].title, "Card A");
    }

    #[tokio::test]
    async fn test_aggregate_survives_unreachable_source() {
        let server = serve(&[("/bbc", BBC_PAGE)]).await;
        let bbc_url = format!("{}/bbc", server.uri());
        let bbc = BbcExtractor::new(&bbc_url).unwrap();

        let (articles, reports) = aggregate(
            &fetcher(),
            &DawnExtractor::new(),
            "http://127.0.0.1:1/",
            &bbc,
            &bbc_url,
        )
        .await;

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Card A");
        assert!(!reports[0].fetched);
        assert_eq!(reports[0].extracted, 0);
        assert!(reports[1].fetched);
    }

    #[tokio::test]
    async fn test_aggregate_survives_error_status() {
        let server = serve(&[("/dawn", DAWN_PAGE)]).await;
        // No mock for /bbc: wiremock answers 404.
        let bbc_url = format!("{}/bbc", server.uri());
        let bbc = BbcExtractor::new(&bbc_url).unwrap();

        let (articles, reports) = aggregate(
            &fetcher(),
            &DawnExtractor::new(),
            &format!("{}/dawn", server.uri()),
            &bbc,
            &bbc_url,
        )
        .await;

        assert_eq!(articles.len(), 2);
        assert!(reports[0].fetched);
        assert!(!reports[1].fetched);
    }
}
