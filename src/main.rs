//! # Article Harvest
//!
//! A scheduled extraction pipeline that harvests article summaries from two
//! news landing pages, normalises them into one `Title,Link,Description`
//! record set, drops records without a description, writes the result as a
//! CSV dataset and hands it to DVC and Git for versioned storage.
//!
//! ## Usage
//!
//! ```sh
//! article_harvest --config harvest.yaml
//! RUST_LOG=article_harvest=debug article_harvest -o /data/articles.csv
//! ```
//!
//! ## Architecture
//!
//! Each invocation is one run of the task chain:
//! 1. **Extract**: fetch both landing pages and apply the site rules
//! 2. **Clean**: keep the records with a non-empty description
//! 3. **Save**: atomically replace the CSV dataset
//! 4. **Publish**: `dvc add`/`dvc push`, then commit and push the pointer file
//!
//! A source that cannot be fetched only makes the dataset smaller. A failed
//! save or publish fails the run with a non-zero exit status.

use clap::Parser;
use std::error::Error;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod orchestrator;
mod outputs;
mod pipeline;
mod publish;
mod retry;
mod scrapers;
mod utils;

use cli::Cli;
use config::PipelineConfig;
use fetch::PageFetcher;
use orchestrator::Orchestrator;
use publish::Publisher;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "article_harvest starting up");

    let args = Cli::parse();
    let config = PipelineConfig::resolve(&args).inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    info!(
        source_a = %config.source_a_url,
        source_b = %config.source_b_url,
        output = %config.output_path.display(),
        publish = config.publish.is_some(),
        "Configuration resolved"
    );

    let fetcher = PageFetcher::new(&config.http)?;
    let publisher = Publisher::from_config(config.publish.as_ref());
    let orchestrator = Orchestrator::new(config, fetcher, publisher)?;

    let summary = orchestrator.run().await.inspect_err(|e| {
        error!(error = %e, "Run failed");
    })?;

    for source in &summary.sources {
        info!(
            source = %source.source,
            url = %source.url,
            fetched = source.fetched,
            extracted = source.extracted,
            skipped = source.skipped,
            "Source summary"
        );
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        raw = summary.raw,
        cleaned = summary.cleaned,
        dataset = %summary.dataset.display(),
        "Execution complete"
    );

    Ok(())
}
