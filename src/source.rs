// src/source.rs

use crate::error::DatasetError;
use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// File formats the loader understands, keyed by suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `.xlsx` workbook
    Spreadsheet,
    /// `.csv` delimited text
    DelimitedText,
}

impl SourceFormat {
    /// Map a file extension to a format. Anything but `xlsx` / `csv` is `None`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" => Some(SourceFormat::Spreadsheet),
            "csv" => Some(SourceFormat::DelimitedText),
            _ => None,
        }
    }
}

/// Where the bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Remote(Url),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// A source string resolved into its location and format tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub location: Location,
    pub format: SourceFormat,
}

impl Source {
    /// Resolve `raw` into a source descriptor.
    ///
    /// `http`/`https` URLs are remote and take their suffix from the URL path,
    /// so query strings do not hide the extension. Everything else is treated
    /// as a local path. Unknown suffixes fail with
    /// [`DatasetError::UnsupportedFormat`]; nothing is opened to guess.
    pub fn parse(raw: &str) -> Result<Self> {
        let location = match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Location::Remote(url),
            _ => Location::Local(PathBuf::from(raw)),
        };

        let ext = match &location {
            Location::Local(path) => extension_of(path),
            Location::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .map(Path::new)
                .and_then(extension_of),
        };

        let format = ext
            .as_deref()
            .and_then(SourceFormat::from_extension)
            .ok_or_else(|| DatasetError::UnsupportedFormat {
                location: raw.to_string(),
            })?;

        Ok(Source { location, format })
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_string)
}
