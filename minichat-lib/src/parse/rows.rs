use std::path::Path;

use csv::ReaderBuilder;

use crate::{Error, Result};

/// Read a CSV file into one part per data row.
///
/// Each row becomes `header: value` lines in column order, so a retrieved
/// chunk is readable without the header row. Rows shorter than the header
/// only render the columns they have.
pub(super) fn extract_rows(path: &Path) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::Parse(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::Parse(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Parse(e.to_string()))?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| format!("{}: {}", header.trim(), value.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        rows.push(row);
    }
    Ok(rows)
}
