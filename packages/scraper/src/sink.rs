//! Output serialization.
//!
//! Reviews are written once, at the end of a run, as either a pretty-printed
//! JSON array or a CSV file with a fixed column order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use review_scrape_models::{OutputFormat, Review};

use crate::ScrapeError;

/// CSV column order.
pub const CSV_COLUMNS: [&str; 5] = ["reviewer", "rating", "date", "text", "source_url"];

/// Writes `reviews` to `path` in the given format.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the file cannot be created or written.
pub fn write_reviews(
    reviews: &[Review],
    path: &Path,
    format: OutputFormat,
) -> Result<(), ScrapeError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        OutputFormat::Json => write_json(reviews, &mut writer)?,
        OutputFormat::Csv => write_csv(reviews, &mut writer)?,
    }

    writer.flush()?;
    Ok(())
}

/// Writes `reviews` as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`ScrapeError::Json`] if serialization or the write fails.
pub fn write_json<W: Write>(reviews: &[Review], writer: W) -> Result<(), ScrapeError> {
    serde_json::to_writer_pretty(writer, reviews)?;
    Ok(())
}

/// Writes `reviews` as CSV. The header row is always written, even when
/// there are no reviews.
///
/// # Errors
///
/// Returns [`ScrapeError::Csv`] if serialization or the write fails.
pub fn write_csv<W: Write>(reviews: &[Review], writer: W) -> Result<(), ScrapeError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_COLUMNS)?;
    for review in reviews {
        csv_writer.serialize(review)?;
    }
    csv_writer.flush()?;
    Ok(())
}
