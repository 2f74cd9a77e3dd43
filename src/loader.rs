// src/loader.rs

use crate::cache::CsvCache;
use crate::config::LoaderConfig;
use crate::dataset::{spreadsheet, Dataset};
use crate::fetch::{Fetch, HttpFetcher};
use crate::observe::{LoadObserver, TracingObserver};
use crate::source::{Location, Source, SourceFormat};
use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufReader, Cursor},
    path::Path,
};

/// Sheet label reported for delimited-text sources. Only ever shown in
/// observer output; the caller's sheet argument is a no-op for `.csv`.
pub const CSV_SHEET_LABEL: &str = "(delimited text, no sheet)";

/// Label reported for `sheet` when reading `format`.
pub fn effective_sheet(format: SourceFormat, sheet: &str) -> &str {
    match format {
        SourceFormat::Spreadsheet => sheet,
        SourceFormat::DelimitedText => CSV_SHEET_LABEL,
    }
}

/// Loads the retail dataset from a workbook or a delimited-text file, and
/// fronts the remote workbook with a one-file disk cache.
pub struct Loader {
    config: LoaderConfig,
    cache: CsvCache,
    fetcher: Box<dyn Fetch>,
    observer: Box<dyn LoadObserver>,
}

impl Loader {
    /// HTTP fetching and tracing output; swap either with the `with_*` methods.
    pub fn new(config: LoaderConfig) -> Result<Self> {
        let cache = CsvCache::new(config.cache_path.clone());
        Ok(Self {
            config,
            cache,
            fetcher: Box::new(HttpFetcher::new()?),
            observer: Box::new(TracingObserver),
        })
    }

    pub fn with_fetcher(mut self, fetcher: impl Fetch + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn with_observer(mut self, observer: impl LoadObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn cache(&self) -> &CsvCache {
        &self.cache
    }

    /// Load `source` by its suffix and check the required columns.
    ///
    /// - `.xlsx`: sheet `sheet` of the workbook, local or fetched.
    /// - `.csv`: the delimited file; `sheet` is ignored, the cache index
    ///   column must be present and is dropped.
    /// - anything else fails before any I/O.
    pub fn load(&self, source: &str, sheet: &str) -> Result<Dataset> {
        let parsed = Source::parse(source)?;
        let sheet = effective_sheet(parsed.format, sheet);
        self.observer.loading(source, sheet);

        let dataset = match parsed.format {
            SourceFormat::Spreadsheet => {
                let raw = match &parsed.location {
                    Location::Local(path) => spreadsheet::read_sheet(open(path)?, sheet)?,
                    Location::Remote(url) => {
                        spreadsheet::read_sheet(Cursor::new(self.fetcher.fetch(url)?), sheet)?
                    }
                };
                Dataset::from_raw(&raw)?
            }
            SourceFormat::DelimitedText => match &parsed.location {
                Location::Local(path) => self.cache.layout().decode(open(path)?, source)?,
                Location::Remote(url) => self
                    .cache
                    .layout()
                    .decode(Cursor::new(self.fetcher.fetch(url)?), source)?,
            },
        };

        dataset.validate()?;
        self.observer.loaded(source, sheet, &dataset);
        Ok(dataset)
    }

    /// Serve the dataset from the cache file when it exists, otherwise from
    /// the remote workbook, writing the cache afterwards.
    pub fn standard_access(&self) -> Result<Dataset> {
        if self.cache.exists() {
            let path = self.cache.path().to_string_lossy();
            return self.load(&path, &self.config.sheet_name);
        }

        let dataset = self.load(&self.config.remote_url, &self.config.sheet_name)?;
        self.cache.write(&dataset)?;
        self.observer.cache_saved(self.cache.path());
        Ok(dataset)
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file))
}
