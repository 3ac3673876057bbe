#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Permit spreadsheet definitions, fetching, and normalization.
//!
//! Each published dataset (electricity, petroliferos, gas LP, natural gas)
//! is described by a TOML [`dataset_def::DatasetDefinition`] embedded at
//! compile time. The definition carries the column alias tables that the
//! [`normalize::Normalizer`] uses to turn raw CSV rows into typed
//! [`energy_map_source_models::Permit`] records.

pub mod csv_download;
pub mod dataset_def;
pub mod normalize;
pub mod parsing;
pub mod progress;
pub mod registry;
pub mod retry;

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while fetching or reading permit data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code returned by the server.
        status: reqwest::StatusCode,
    },

    /// I/O error (local file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A dataset definition is malformed or missing.
    #[error("Dataset definition error: {message}")]
    Definition {
        /// Description of what went wrong.
        message: String,
    },
}

/// Where a document (CSV or `GeoJSON`) is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// Remote document fetched over HTTP(S).
    Url(String),
    /// Local file.
    Path(PathBuf),
}

impl SourceLocation {
    /// Interprets `http://` and `https://` prefixes as URLs and anything
    /// else as a filesystem path.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads a whole text document from a URL (with retry) or a local file.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails after all retries, the
/// server returns a non-success status, or the file cannot be read.
pub async fn fetch_text(
    client: &reqwest::Client,
    location: &SourceLocation,
) -> Result<String, SourceError> {
    match location {
        SourceLocation::Url(url) => {
            log::debug!("Fetching {url}");
            retry::send_text(|| client.get(url)).await
        }
        SourceLocation::Path(path) => {
            log::debug!("Reading {}", path.display());
            Ok(tokio::fs::read_to_string(path).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_locations() {
        assert_eq!(
            SourceLocation::parse(" https://example.org/a.csv "),
            SourceLocation::Url("https://example.org/a.csv".to_string())
        );
    }

    #[test]
    fn parses_path_locations() {
        assert_eq!(
            SourceLocation::parse("data/permisos.csv"),
            SourceLocation::Path(PathBuf::from("data/permisos.csv"))
        );
    }
}
