// src/cache.rs

use crate::dataset::{delimited, raw_table::RawTable, Dataset};
use crate::error::DatasetError;
use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Int64Array},
    csv::WriterBuilder,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    fs::{self, File},
    io::{BufWriter, ErrorKind, Read, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::debug;

/// Column layout of the delimited-text cache file.
///
/// Version 1: a header row, then a leading row-index column `0..n` with an
/// empty header, then the dataset columns in order. Timestamps are written
/// with `timestamp_format`, nulls as empty fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLayout {
    pub version: u32,
    /// Header written for the index column.
    pub index_header: &'static str,
    /// Headers recognized as the index column on read. pandas reads an
    /// unnamed leading column back as `Unnamed: 0`.
    pub index_aliases: &'static [&'static str],
    pub timestamp_format: &'static str,
}

pub const CACHE_LAYOUT: CacheLayout = CacheLayout {
    version: 1,
    index_header: "",
    index_aliases: &["", "Unnamed: 0"],
    timestamp_format: "%Y-%m-%d %H:%M:%S",
};

impl CacheLayout {
    pub fn index_position(&self, headers: &[String]) -> Option<usize> {
        headers
            .iter()
            .position(|h| self.index_aliases.contains(&h.as_str()))
    }

    /// Drop the index column from `raw`. Fails with
    /// [`DatasetError::MissingIndexColumn`] when there is none.
    pub fn strip_index(&self, raw: &mut RawTable, location: &str) -> Result<()> {
        let idx = self
            .index_position(&raw.headers)
            .ok_or_else(|| DatasetError::MissingIndexColumn {
                location: location.to_string(),
            })?;
        raw.remove_column(idx);
        Ok(())
    }

    /// Parse delimited text in this layout into a dataset, index column removed.
    pub fn decode<R: Read>(&self, reader: R, location: &str) -> Result<Dataset> {
        let mut raw = delimited::read_records(reader)?;
        self.strip_index(&mut raw, location)?;
        Dataset::from_raw(&raw)
    }

    /// The dataset's record batch with the index column prepended.
    pub fn with_index(&self, dataset: &Dataset) -> Result<RecordBatch> {
        let batch = dataset.record_batch();
        let index: ArrayRef = Arc::new(Int64Array::from_iter_values(0..batch.num_rows() as i64));

        let mut fields = vec![Arc::new(Field::new(self.index_header, DataType::Int64, false))];
        fields.extend(batch.schema().fields().iter().cloned());
        let mut columns = vec![index];
        columns.extend(batch.columns().iter().cloned());

        RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
            .context("building indexed cache batch")
    }

    /// Write `dataset` as delimited text in this layout.
    pub fn encode<W: Write>(&self, dataset: &Dataset, writer: W) -> Result<W> {
        let indexed = self.with_index(dataset)?;
        let mut csv_writer = WriterBuilder::new()
            .with_header(true)
            .with_timestamp_format(self.timestamp_format.to_string())
            .build(writer);
        csv_writer.write(&indexed).context("writing cache rows")?;
        Ok(csv_writer.into_inner())
    }
}

/// The single on-disk cache file. Never refreshed automatically; an operator
/// calls [`CsvCache::remove`] to force the next access to refetch.
#[derive(Debug, Clone)]
pub struct CsvCache {
    path: PathBuf,
    layout: CacheLayout,
}

impl CsvCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            layout: CACHE_LAYOUT,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Existence is the only freshness signal.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write `dataset` to the cache path, creating the parent directory.
    /// Rows go to a `.tmp` sibling first, which is renamed into place once
    /// complete.
    pub fn write(&self, dataset: &Dataset) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating cache directory {:?}", parent))?;
        }

        let temp_path = self.path.with_extension("tmp");
        if let Err(e) = self.write_then_rename(dataset, &temp_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        debug!(path = %self.path.display(), rows = dataset.num_rows(), version = self.layout.version, "wrote cache");
        Ok(())
    }

    fn write_then_rename(&self, dataset: &Dataset, temp_path: &Path) -> Result<()> {
        let file = File::create(temp_path)
            .with_context(|| format!("could not create temporary file `{}`", temp_path.display()))?;
        let mut buf = self.layout.encode(dataset, BufWriter::new(file))?;
        buf.flush()
            .with_context(|| format!("flushing `{}`", temp_path.display()))?;
        drop(buf);

        fs::rename(temp_path, &self.path).with_context(|| {
            format!(
                "failed to rename `{}` to `{}`",
                temp_path.display(),
                self.path.display()
            )
        })
    }

    /// Delete the cache file. Returns whether a file was removed.
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("removing cache {}", self.path.display())),
        }
    }
}
