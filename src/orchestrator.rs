//! Run orchestration.
//!
//! One [`Orchestrator::run`] is one scheduled run of the task chain
//!
//! ```text
//! extract → clean → save → publish
//! ```
//!
//! Values flow between tasks as typed Rust values. `extract` and `clean`
//! degrade instead of failing. `save` and `publish` run under the configured
//! [`RetryPolicy`] and propagate their error once retries are exhausted.
//! `publish` only ever sees the path returned by a completed `save`.

use crate::config::PipelineConfig;
use crate::error::{ConfigError, PipelineError, PublishError, WriteError};
use crate::fetch::PageFetcher;
use crate::models::{ArticleBatch, CleanedArticle, RawArticle};
use crate::outputs::dataset::write_dataset;
use crate::pipeline::{aggregate, clean};
use crate::publish::DatasetPublisher;
use crate::retry::RetryPolicy;
use crate::scrapers::{BbcExtractor, DawnExtractor, SourceReport};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub sources: Vec<SourceReport>,
    pub raw: usize,
    pub cleaned: usize,
    pub dataset: PathBuf,
}

pub struct Orchestrator<P> {
    config: PipelineConfig,
    fetcher: PageFetcher,
    dawn: DawnExtractor,
    bbc: BbcExtractor,
    publisher: P,
    retry: RetryPolicy,
}

impl<P> Orchestrator<P>
where
    P: DatasetPublisher,
{
    /// Wire the task chain from an already validated configuration.
    pub fn new(
        config: PipelineConfig,
        fetcher: PageFetcher,
        publisher: P,
    ) -> Result<Self, PipelineError> {
        let bbc = BbcExtractor::new(&config.source_b_url).map_err(|source| ConfigError::InvalidUrl {
            url: config.source_b_url.clone(),
            source,
        })?;
        let retry = RetryPolicy::from(&config.retry);
        Ok(Self {
            config,
            fetcher,
            dawn: DawnExtractor::new(),
            bbc,
            publisher,
            retry,
        })
    }

    /// Override the retry policy taken from the configuration.
    #[cfg(test)]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run the task chain once.
    ///
    /// # Returns
    ///
    /// A [`RunSummary`] with the per-source reports, record counts and the
    /// dataset path.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Write`] or [`PipelineError::Publish`] once the task's
    /// retries are exhausted. A failed `save` means `publish` never runs.
    #[instrument(level = "info", skip_all, fields(output = %self.config.output_path.display()))]
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let (raw, sources) = self.extract().await;
        let raw_count = raw.len();
        let cleaned = clean(raw);
        let cleaned_count = cleaned.len();
        let dataset = self.save(&cleaned).await?;
        self.publish(&dataset).await?;

        Ok(RunSummary {
            sources,
            raw: raw_count,
            cleaned: cleaned_count,
            dataset,
        })
    }

    async fn extract(&self) -> (ArticleBatch<RawArticle>, Vec<SourceReport>) {
        aggregate(
            &self.fetcher,
            &self.dawn,
            &self.config.source_a_url,
            &self.bbc,
            &self.config.source_b_url,
        )
        .await
    }

    async fn save(&self, rows: &[CleanedArticle]) -> Result<PathBuf, WriteError> {
        let destination = self.config.output_path.as_path();
        self.retry
            .run("save", move || async move { write_dataset(rows, destination) })
            .await
    }

    async fn publish(&self, dataset: &Path) -> Result<(), PublishError> {
        let publisher = &self.publisher;
        self.retry
            .run("publish", move || publisher.publish(dataset))
            .await?;
        info!(dataset = %dataset.display(), "Dataset published");
        Ok(())
    }
}
