// src/error.rs

use thiserror::Error;

/// Domain failures raised while loading the retail dataset.
///
/// Loader functions return `anyhow::Result`; these values travel inside the
/// `anyhow::Error` and can be recovered with `downcast_ref::<DatasetError>()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    /// The source suffix is neither `.xlsx` nor `.csv`.
    #[error("unsupported source format: {location}")]
    UnsupportedFormat { location: String },

    /// One or more required columns are absent after loading.
    #[error("dataset is missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    /// A delimited-text source without the cache index column.
    #[error("index column not found in {location}")]
    MissingIndexColumn { location: String },

    #[error("column '{column}', row {row}: '{value}' is not a date/time")]
    InvalidDateTime {
        column: String,
        row: usize,
        value: String,
    },

    #[error("sheet '{sheet}' has no header row")]
    EmptySheet { sheet: String },
}
