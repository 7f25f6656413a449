//! CSV upload boundary
//!
//! Reads the `Review` column of an uploaded spreadsheet. Only the first
//! `row_limit` data rows are read; later rows are ignored, not rejected.
//! Blank review cells are skipped.

use std::io::Read;
use thiserror::Error;

pub const REVIEW_COLUMN: &str = "Review";

#[derive(Debug, Error)]
pub enum ReviewReadError {
    #[error("CSV has no \"Review\" column")]
    MissingColumn,

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

/// Extract review texts from CSV bytes
pub fn read_reviews<R: Read>(reader: R, row_limit: usize) -> Result<Vec<String>, ReviewReadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h == REVIEW_COLUMN)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(REVIEW_COLUMN)))
        .ok_or(ReviewReadError::MissingColumn)?;

    let mut reviews = Vec::new();
    let mut skipped = 0usize;

    for record in csv_reader.records().take(row_limit) {
        let record = record?;
        match record.get(column).map(str::trim) {
            Some(text) if !text.is_empty() => reviews.push(text.to_string()),
            _ => skipped += 1,
        }
    }

    tracing::debug!(reviews = reviews.len(), skipped, row_limit, "Read reviews from CSV");
    Ok(reviews)
}
