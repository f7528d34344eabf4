//! Error kinds raised by the harvest pipeline.
//!
//! Each stage owns one error type so callers can decide which failures are
//! recoverable:
//!
//! - [`FetchError`]: recovered by the aggregator (the source contributes no rows)
//! - [`ParseStructureError`]: recovered by the extractor (only that record is dropped)
//! - [`WriteError`]: fatal, the run has nothing to publish
//! - [`PublishError`]: fatal, reported by the publish task
//! - [`ConfigError`]: fatal, raised before any stage runs

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failure to retrieve a landing page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. } | FetchError::Status { url, .. } => url,
        }
    }
}

/// A block matched the container pattern but lacks a mandatory element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source_name} block #{block} has no {missing}")]
pub struct ParseStructureError {
    pub source_name: &'static str,
    pub block: usize,
    pub missing: &'static str,
}

/// The dataset file could not be produced.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// An external versioning step failed.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("could not start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program} {args}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        args: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("cannot resolve dataset path {path}: {source}")]
    DatasetPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Errors that end a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}
