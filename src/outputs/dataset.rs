//! Dataset file writer.
//!
//! The dataset is a UTF-8, comma-separated file with the header
//! `Title,Link,Description` followed by one row per cleaned article. Every run
//! replaces the previous file.
//!
//! Rows are written to a sibling temporary file which is flushed, synced and
//! then renamed over the destination, so readers (and the publisher) only ever
//! see a complete file. A failed write leaves any previous dataset untouched.

use crate::error::WriteError;
use crate::models::CleanedArticle;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub const HEADER: [&str; 3] = ["Title", "Link", "Description"];

/// Write `rows` to `destination`, returning the path of the closed file.
///
/// # Arguments
///
/// * `rows` - Cleaned articles, written in order after the header row.
/// * `destination` - Final dataset path. Its parent directory must exist.
///
/// # Returns
///
/// The destination path once the file is complete and renamed into place.
///
/// # Errors
///
/// [`WriteError`] when the staging file cannot be written or renamed. In both
/// cases the staging file is removed and any previous dataset is left as is.
#[instrument(level = "info", skip(rows), fields(rows = rows.len(), path = %destination.display()))]
pub fn write_dataset(rows: &[CleanedArticle], destination: &Path) -> Result<PathBuf, WriteError> {
    let staging = staging_path(destination);

    let written = write_rows(rows, &staging).and_then(|()| {
        fs::rename(&staging, destination).map_err(|source| WriteError::Io {
            path: destination.to_path_buf(),
            source,
        })
    });
    if let Err(e) = written {
        discard_staging(&staging);
        return Err(e);
    }

    info!("Wrote dataset");
    Ok(destination.to_path_buf())
}

fn discard_staging(staging: &Path) {
    if staging.exists() {
        if let Err(cleanup) = fs::remove_file(staging) {
            warn!(path = %staging.display(), error = %cleanup, "Could not remove staging file");
        }
    }
}

fn write_rows(rows: &[CleanedArticle], staging: &Path) -> Result<(), WriteError> {
    let io_error = |source| WriteError::Io {
        path: staging.to_path_buf(),
        source,
    };
    let csv_error = |source| WriteError::Csv {
        path: staging.to_path_buf(),
        source,
    };

    let file = File::create(staging).map_err(io_error)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(HEADER).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row.as_row()).map_err(csv_error)?;
    }

    let file = writer
        .into_inner()
        .map_err(|e| io_error(e.into_error()))?;
    file.sync_all().map_err(io_error)
}

/// `articles.csv` is staged as `.articles.csv.tmp` in the same directory so
/// the final rename never crosses filesystems.
fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    destination.with_file_name(format!(".{name}.tmp"))
}
