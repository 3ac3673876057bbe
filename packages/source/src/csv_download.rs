//! Published-spreadsheet CSV download and parsing.
//!
//! Spreadsheets are published as CSV exports. The text is parsed with the
//! first row as headers and every data row becomes a [`RawRow`] keyed by
//! those headers.

use std::sync::Arc;

use energy_map_source_models::RawRow;

use crate::progress::ProgressCallback;
use crate::{SourceError, SourceLocation, fetch_text};

/// Appends a `cb=<millis>` query parameter so CDN and spreadsheet caches
/// return the latest published export.
#[must_use]
pub fn with_cache_buster(url: &str, millis: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}cb={millis}")
}

/// Parses CSV text into header-keyed rows.
///
/// Headers are trimmed (and a leading byte-order mark removed), short rows
/// are padded with empty strings, and rows whose cells are all blank are
/// skipped.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] on malformed CSV, or
/// [`SourceError::Definition`] if the text has no header row.
pub fn parse_csv_rows(text: &str) -> Result<Vec<RawRow>, SourceError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::Definition {
            message: "CSV document contains no header row".to_owned(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let row: RawRow = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_owned()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Downloads (or reads) a CSV document and parses it into rows.
///
/// # Errors
///
/// Returns [`SourceError`] if the document cannot be fetched or parsed.
pub async fn fetch_rows(
    client: &reqwest::Client,
    location: &SourceLocation,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<RawRow>, SourceError> {
    progress.set_message(format!("Downloading {location}"));

    let location = match location {
        SourceLocation::Url(url) => SourceLocation::Url(with_cache_buster(
            url,
            chrono::Utc::now().timestamp_millis(),
        )),
        SourceLocation::Path(_) => location.clone(),
    };

    let text = fetch_text(client, &location).await?;
    log::debug!("Received {} bytes of CSV", text.len());

    let rows = parse_csv_rows(&text)?;
    log::info!("Parsed {} rows from {location}", rows.len());
    progress.finish(format!("{} rows", rows.len()));

    Ok(rows)
}
