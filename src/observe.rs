// src/observe.rs

use crate::dataset::Dataset;
use std::path::Path;
use tracing::info;

/// Hooks called around loading. The loader itself does no logging; whatever
/// is reported goes through the observer it was given.
pub trait LoadObserver {
    /// Before a source is read. `sheet` is the effective label.
    fn loading(&self, _source: &str, _sheet: &str) {}

    /// After a source was read and validated.
    fn loaded(&self, _source: &str, _sheet: &str, _dataset: &Dataset) {}

    /// After a fresh copy was written to the cache file.
    fn cache_saved(&self, _path: &Path) {}
}

/// Reports through `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn loading(&self, source: &str, sheet: &str) {
        info!(source, sheet, "loading");
    }

    fn loaded(&self, source: &str, sheet: &str, dataset: &Dataset) {
        info!(
            source,
            sheet,
            rows = dataset.num_rows(),
            columns = dataset.num_columns(),
            "loaded"
        );
    }

    fn cache_saved(&self, path: &Path) {
        info!(path = %path.display(), "saved cache copy");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LoadObserver for NoopObserver {}
