use super::convert::Cell;
use super::raw_table::RawTable;
use super::{date_parser, INVOICE_DATE};
use crate::error::DatasetError;
use anyhow::{Context, Result};
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime, SubsecRound};
use std::io::{Read, Seek};
use tracing::debug;

/// Read one named sheet of an `.xlsx` workbook. The first used row is the
/// header row; every following row is a record.
pub fn read_sheet<R: Read + Seek>(reader: R, sheet: &str) -> Result<RawTable> {
    let mut workbook: Xlsx<R> = open_workbook_from_rs(reader).context("opening xlsx workbook")?;
    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("reading sheet '{}'", sheet))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| DatasetError::EmptySheet {
        sheet: sheet.to_string(),
    })?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| header_name(i, cell))
        .collect();
    let invoice_date_idx = headers.iter().position(|h| h == INVOICE_DATE);
    let system = DateSystem::detect(&range);

    let mut raw = RawTable::new(headers);
    for row in rows {
        raw.push_row(row.iter().enumerate().map(|(idx, data)| {
            if Some(idx) == invoice_date_idx {
                to_datetime_cell(data, system)
            } else {
                to_cell(data)
            }
        }));
    }

    debug!(sheet, rows = raw.num_rows, columns = raw.headers.len(), ?system, "read sheet");
    Ok(raw)
}

/// Blank header cells get the `Unnamed: <i>` name other tabular tools use.
fn header_name(idx: usize, cell: &Data) -> String {
    match cell {
        Data::Empty => format!("Unnamed: {}", idx),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        // serials are floats; snap to the millisecond so 07:45 is not 07:44:59.999999
        Data::DateTime(edt) => edt
            .as_datetime()
            .map(|dt| Cell::DateTime(dt.round_subsecs(3)))
            .unwrap_or_else(|| Cell::Float(edt.as_f64())),
        Data::DateTimeIso(s) => date_parser::parse_datetime(s)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        other => Cell::Text(other.to_string()),
    }
}

/// Like [`to_cell`], but plain numbers are read as Excel serial dates.
fn to_datetime_cell(data: &Data, system: DateSystem) -> Cell {
    let serial = match data {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    };
    match serial.and_then(|s| from_excel_serial(s, system)) {
        Some(dt) => Cell::DateTime(dt),
        None => to_cell(data),
    }
}

/// Excel workbook date systems. Day 0 is 1899-12-30 in the default one and
/// 1904-01-01 in the one older Mac workbooks use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateSystem {
    Excel1900,
    Excel1904,
}

impl DateSystem {
    fn epoch(self) -> Option<NaiveDateTime> {
        let (y, m, d) = match self {
            DateSystem::Excel1900 => (1899, 12, 30),
            DateSystem::Excel1904 => (1904, 1, 1),
        };
        NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)
    }

    /// calamine exposes the workbook's system only through styled date
    /// cells, so the first one in the sheet decides. A sheet without any is
    /// read in the 1900 system.
    fn detect(range: &Range<Data>) -> Self {
        range
            .used_cells()
            .find_map(|(_, _, data)| match data {
                Data::DateTime(edt) => {
                    let dt = edt.as_datetime()?;
                    let as_1900 = from_excel_serial(edt.as_f64(), DateSystem::Excel1900)?;
                    // the two epochs are 1462 days apart
                    Some(if (dt - as_1900).num_days() > 1000 {
                        DateSystem::Excel1904
                    } else {
                        DateSystem::Excel1900
                    })
                }
                _ => None,
            })
            .unwrap_or(DateSystem::Excel1900)
    }
}

/// Serial day number to date/time; fractions are time of day.
fn from_excel_serial(serial: f64, system: DateSystem) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = system.epoch()?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}
