use super::convert::Cell;
use super::raw_table::RawTable;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::io::Read;
use tracing::debug;

/// Read comma-delimited text with a header row into a raw table.
///
/// Fields are classified with [`Cell::from_text`]; quoting follows RFC 4180.
/// A record with a different field count than the header is an error.
pub fn read_records<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw = RawTable::new(headers);
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        raw.push_row(record.iter().map(Cell::from_text));
    }

    debug!(rows = raw.num_rows, columns = raw.headers.len(), "read delimited text");
    Ok(raw)
}
