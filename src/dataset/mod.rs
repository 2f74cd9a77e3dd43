// src/dataset/mod.rs
//
// In-memory retail dataset and the readers that produce it.
//
//   .xlsx ─► spreadsheet ─┐
//                         ├─► RawTable (cells) ─► convert ─► Dataset (RecordBatch)
//   .csv  ─► delimited  ──┘

pub mod convert;
pub mod date_parser;
pub mod delimited;
pub mod raw_table;
pub mod spreadsheet;

use crate::error::DatasetError;
use anyhow::{Context, Result};
use arrow::{
    array::ArrayRef,
    datatypes::{DataType, Schema, SchemaRef},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use raw_table::RawTable;
use std::sync::Arc;

/// Column holding the invoice timestamp; always date/time typed after loading.
pub const INVOICE_DATE: &str = "InvoiceDate";

/// Columns every loaded dataset must carry (order irrelevant).
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Invoice",
    "StockCode",
    "Description",
    "Quantity",
    INVOICE_DATE,
    "Price",
    "Customer ID",
    "Country",
];

/// Retail invoice line items with named, typed columns in source row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Type the columns of a raw table.
    ///
    /// Every column is typed by inference except [`INVOICE_DATE`], which is
    /// forced to a timestamp column.
    pub fn from_raw(raw: &RawTable) -> Result<Self> {
        let mut fields = Vec::with_capacity(raw.headers.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(raw.headers.len());

        for (name, cells) in raw.headers.iter().zip(raw.columns.iter()) {
            let (field, array) = if name == INVOICE_DATE {
                convert::build_timestamp_column(name, cells)?
            } else {
                convert::build_column(name, cells)
            };
            fields.push(field);
            arrays.push(array);
        }

        // row count is explicit so a header-only file still yields an empty table
        let options = RecordBatchOptions::new().with_row_count(Some(raw.num_rows));
        let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)
            .context("building dataset record batch")?;
        Ok(Self { batch })
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Arrow type of `name`, if present.
    pub fn column_type(&self, name: &str) -> Option<DataType> {
        self.batch
            .schema()
            .field_with_name(name)
            .ok()
            .map(|f| f.data_type().clone())
    }

    /// Required columns absent from this dataset, in [`REQUIRED_COLUMNS`] order.
    pub fn missing_columns(&self) -> Vec<String> {
        let schema = self.batch.schema();
        REQUIRED_COLUMNS
            .iter()
            .filter(|name| schema.index_of(name).is_err())
            .map(|name| name.to_string())
            .collect()
    }

    /// Check the required column set. Fails with [`DatasetError::MissingColumns`].
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_columns();
        if !missing.is_empty() {
            return Err(DatasetError::MissingColumns { missing }.into());
        }
        Ok(())
    }
}
