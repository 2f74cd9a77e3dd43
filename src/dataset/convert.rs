use super::date_parser;
use crate::error::DatasetError;
use anyhow::Result;
use arrow::{
    array::{ArrayRef, Float64Builder, Int64Builder, StringBuilder, TimestampMicrosecondBuilder},
    datatypes::{DataType, Field, TimeUnit},
};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// The timestamp type every date/time column ends up with.
pub const TIMESTAMP_TYPE: DataType = DataType::Timestamp(TimeUnit::Microsecond, None);

/// One cell, as read from either source format, before columns are typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    /// A float parsed from delimited text, with the field as written. Text
    /// columns render the field, so `2.50` or `1e3` survive unchanged.
    ParsedFloat(f64, String),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Classify a delimited-text field. Empty → `Empty`, integers and floats
    /// as numbers, everything else stays text. Dates are not guessed here.
    pub fn from_text(raw: &str) -> Cell {
        let s = raw.trim();
        if s.is_empty() {
            return Cell::Empty;
        }
        // codes like "085048" keep their text so nothing is lost on re-render
        if let Ok(i) = s.parse::<i64>() {
            if i.to_string() == s {
                return Cell::Int(i);
            }
            return Cell::Text(raw.to_string());
        }
        // "nan" / "inf" parse as f64 but are words in this data
        if s.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(f) = s.parse::<f64>() {
                return Cell::ParsedFloat(f, raw.to_string());
            }
        }
        Cell::Text(raw.to_string())
    }

    fn render(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::ParsedFloat(_, text) => Some(text.clone()),
            Cell::Text(s) => Some(s.clone()),
            Cell::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            Cell::Text(s) => date_parser::parse_datetime(s),
            _ => None,
        }
    }
}

/// Pick the Arrow type for a column from its non-empty cells.
///
/// - all integral numbers (ints, or floats without a fraction) → Int64
/// - all numbers → Float64
/// - all date/times → Timestamp(µs)
/// - anything else, or no values at all → Utf8
pub fn infer_type(cells: &[Cell]) -> DataType {
    let mut seen_any = false;
    let mut all_integral = true;
    let mut all_numeric = true;
    let mut all_datetime = true;

    for cell in cells {
        match cell {
            Cell::Empty => continue,
            Cell::Int(_) => all_datetime = false,
            Cell::Float(f) | Cell::ParsedFloat(f, _) => {
                all_datetime = false;
                if f.fract() != 0.0 || !f.is_finite() {
                    all_integral = false;
                }
            }
            Cell::DateTime(_) => {
                all_numeric = false;
                all_integral = false;
            }
            Cell::Text(_) => return DataType::Utf8,
        }
        seen_any = true;
    }

    match (seen_any, all_numeric, all_integral, all_datetime) {
        (false, ..) => DataType::Utf8,
        (true, true, true, _) => DataType::Int64,
        (true, true, false, _) => DataType::Float64,
        (true, false, _, true) => TIMESTAMP_TYPE,
        _ => DataType::Utf8,
    }
}

/// Build an inferred-type column.
pub fn build_column(name: &str, cells: &[Cell]) -> (Field, ArrayRef) {
    let data_type = infer_type(cells);
    let array: ArrayRef = match &data_type {
        DataType::Int64 => {
            let mut b = Int64Builder::with_capacity(cells.len());
            for cell in cells {
                match cell {
                    Cell::Int(i) => b.append_value(*i),
                    Cell::Float(f) | Cell::ParsedFloat(f, _) => b.append_value(*f as i64),
                    _ => b.append_null(),
                }
            }
            Arc::new(b.finish())
        }
        DataType::Float64 => {
            let mut b = Float64Builder::with_capacity(cells.len());
            for cell in cells {
                match cell {
                    Cell::Int(i) => b.append_value(*i as f64),
                    Cell::Float(f) | Cell::ParsedFloat(f, _) => b.append_value(*f),
                    _ => b.append_null(),
                }
            }
            Arc::new(b.finish())
        }
        DataType::Timestamp(..) => {
            let mut b = TimestampMicrosecondBuilder::with_capacity(cells.len());
            for cell in cells {
                b.append_option(cell.as_datetime().map(|dt| dt.and_utc().timestamp_micros()));
            }
            Arc::new(b.finish())
        }
        _ => {
            let mut b = StringBuilder::with_capacity(cells.len(), cells.len() * 8);
            for cell in cells {
                b.append_option(cell.render());
            }
            Arc::new(b.finish())
        }
    };
    (Field::new(name, data_type, true), array)
}

/// Build a column that must be date/time typed. Text is parsed, native
/// date/times pass through, empty cells become nulls, and anything else is a
/// [`DatasetError::InvalidDateTime`].
///
/// Numeric cells are rejected here; spreadsheet readers turn serial dates
/// into `Cell::DateTime` before calling this.
pub fn build_timestamp_column(name: &str, cells: &[Cell]) -> Result<(Field, ArrayRef)> {
    let mut b = TimestampMicrosecondBuilder::with_capacity(cells.len());
    for (row, cell) in cells.iter().enumerate() {
        if *cell == Cell::Empty {
            b.append_null();
            continue;
        }
        let dt = cell.as_datetime().ok_or_else(|| DatasetError::InvalidDateTime {
            column: name.to_string(),
            row,
            value: cell.render().unwrap_or_default(),
        })?;
        b.append_value(dt.and_utc().timestamp_micros());
    }
    Ok((
        Field::new(name, TIMESTAMP_TYPE, true),
        Arc::new(b.finish()) as ArrayRef,
    ))
}
