//! Command-line interface definitions.
//!
//! Only configuration is accepted: an optional YAML file plus overrides for
//! the two source URLs and the dataset path. Each override can also come
//! from an environment variable.

use clap::Parser;
use std::path::PathBuf;

/// Harvest article summaries from two news landing pages into a CSV dataset.
///
/// # Examples
///
/// ```sh
/// # Defaults: dawn.com + bbc.com into ./articles.csv, no publishing
/// article_harvest
///
/// # Full configuration, including DVC/Git publishing
/// article_harvest --config harvest.yaml
///
/// # Override the destination
/// article_harvest -o /data/articles.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Landing page of the story-block source (SourceA)
    #[arg(long, env = "SOURCE_A_URL")]
    pub source_a_url: Option<String>,

    /// Landing page of the card-grid source (SourceB)
    #[arg(long, env = "SOURCE_B_URL")]
    pub source_b_url: Option<String>,

    /// Destination of the dataset file
    #[arg(short, long, env = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "article_harvest",
            "--source-a-url",
            "https://a.example/",
            "--source-b-url",
            "https://b.example/",
            "--output",
            "./articles.csv",
        ]);

        assert_eq!(cli.source_a_url.as_deref(), Some("https://a.example/"));
        assert_eq!(cli.source_b_url.as_deref(), Some("https://b.example/"));
        assert_eq!(cli.output, Some(PathBuf::from("./articles.csv")));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["article_harvest", "-c", "/etc/harvest.yaml", "-o", "/tmp/a.csv"]);

        assert_eq!(cli.config, Some(PathBuf::from("/etc/harvest.yaml")));
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/a.csv")));
    }
}
