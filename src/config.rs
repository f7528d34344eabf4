//! Run configuration.
//!
//! A [`PipelineConfig`] is read from an optional YAML file, then the CLI
//! overrides are applied on top. The resolved value is passed explicitly to
//! [`crate::orchestrator::Orchestrator::new`]; nothing is stored globally.

use crate::cli::Cli;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_SOURCE_A_URL: &str = "https://www.dawn.com/";
pub const DEFAULT_SOURCE_B_URL: &str = "https://www.bbc.com/";
pub const DEFAULT_OUTPUT_PATH: &str = "articles.csv";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Landing page of the story-block site.
    pub source_a_url: String,
    /// Landing page of the card-grid site; its origin resolves relative card links.
    pub source_b_url: String,
    /// Destination of the dataset file.
    pub output_path: PathBuf,
    pub http: HttpConfig,
    pub retry: RetryConfig,
    /// Publishing is skipped when absent.
    pub publish: Option<PublishConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_a_url: DEFAULT_SOURCE_A_URL.to_string(),
            source_b_url: DEFAULT_SOURCE_B_URL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
            publish: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry policy applied to every task of a run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    /// Extra attempts after the first failure.
    pub retries: usize,
    pub delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 1,
            delay_secs: 300,
            max_delay_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Directory the `dvc` and `git` commands run in.
    pub workdir: PathBuf,
    pub dvc_program: String,
    pub dvc_remote_name: String,
    pub dvc_remote_url: String,
    pub git_program: String,
    pub git_remote_url: String,
    pub git_branch: String,
    pub commit_message: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            workdir: PathBuf::from("."),
            dvc_program: "dvc".to_string(),
            dvc_remote_name: "drive".to_string(),
            dvc_remote_url: String::new(),
            git_program: "git".to_string(),
            git_remote_url: String::new(),
            git_branch: "main".to_string(),
            commit_message: "Data added and pushed".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document. Missing keys take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    #[instrument(level = "info", skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&yaml)?;
        info!("Loaded configuration file");
        Ok(config)
    }

    /// Build the effective configuration: file (if any), then CLI overrides.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(url) = &cli.source_a_url {
            config.source_a_url = url.clone();
        }
        if let Some(url) = &cli.source_b_url {
            config.source_b_url = url.clone();
        }
        if let Some(path) = &cli.output {
            config.output_path = path.clone();
        }
        config.validate()?;
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    /// Both source URLs must be absolute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.source_a_url, &self.source_b_url] {
            Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
                url: url.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_sources_and_retry() {
        let config = PipelineConfig::default();
        assert_eq!(config.source_a_url, "https://www.dawn.com/");
        assert_eq!(config.source_b_url, "https://www.bbc.com/");
        assert_eq!(config.output_path, PathBuf::from("articles.csv"));
        assert_eq!(config.retry.retries, 1);
        assert_eq!(config.retry.delay_secs, 300);
        assert!(config.publish.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = PipelineConfig::from_yaml(
            r#"
output_path: /data/articles.csv
publish:
  dvc_remote_url: gdrive://folder
  git_remote_url: https://example.com/repo.git
"#,
        )
        .unwrap();
        assert_eq!(config.output_path, PathBuf::from("/data/articles.csv"));
        assert_eq!(config.source_a_url, DEFAULT_SOURCE_A_URL);
        let publish = config.publish.unwrap();
        assert_eq!(publish.dvc_remote_name, "drive");
        assert_eq!(publish.git_branch, "main");
        assert_eq!(publish.dvc_remote_url, "gdrive://folder");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = PipelineConfig::from_yaml("source_c_url: https://example.com/").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "source_a_url: https://a.example/\noutput_path: from-file.csv").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "article_harvest",
            "--config",
            path.as_str(),
            "--output",
            "from-cli.csv",
        ]);
        let config = PipelineConfig::resolve(&cli).unwrap();
        assert_eq!(config.source_a_url, "https://a.example/");
        assert_eq!(config.output_path, PathBuf::from("from-cli.csv"));
    }

    #[test]
    fn test_relative_source_url_is_rejected() {
        let config = PipelineConfig {
            source_b_url: "/news".to_string(),
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_missing_config_file() {
        let err = PipelineConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
