//! Loading transaction records from CSV or JSON text.
//!
//! Both formats use the source column names (`customerEmail`,
//! `discountAmount`, ...). Unknown columns are ignored.

use std::path::Path;

use crate::error::AnalyticsError;
use crate::model::TransactionRecord;

/// Parse a JSON array of records.
pub fn from_json(input: &str) -> Result<Vec<TransactionRecord>, AnalyticsError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(input).map_err(|e| AnalyticsError::DataParse {
            format: "json",
            record: 0,
            message: e.to_string(),
        })?;

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value(value).map_err(|e| AnalyticsError::DataParse {
                format: "json",
                record: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Parse CSV with a header row. Empty cells are absent values.
pub fn from_csv(input: &str) -> Result<Vec<TransactionRecord>, AnalyticsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(input.as_bytes());

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<TransactionRecord>().enumerate() {
        let record = row.map_err(|e| AnalyticsError::DataParse {
            format: "csv",
            record: i + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Read `path` and parse it by extension (`.csv` or `.json`).
pub fn from_path(path: &Path) -> Result<Vec<TransactionRecord>, AnalyticsError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let parse: fn(&str) -> Result<Vec<TransactionRecord>, AnalyticsError> = match ext.as_str() {
        "csv" => from_csv,
        "json" => from_json,
        _ => return Err(AnalyticsError::UnknownFormat(ext)),
    };

    let text = std::fs::read_to_string(path)
        .map_err(|e| AnalyticsError::Io(format!("cannot read {}: {e}", path.display())))?;
    let records = parse(&text)?;
    log::debug!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
