// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use url::Url;

/// Public workbook of the UCI "Online Retail II" dataset.
pub const REMOTE_FILE: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/00502/online_retail_II.xlsx";

/// Sheet holding the first year of transactions.
pub const SHEET_NAME: &str = "Year 2009-2010";

/// Cache location relative to a base directory.
pub const CACHE_RELATIVE_PATH: [&str; 2] = ["data", "raw.csv"];

/// Where the data comes from and where the cached copy lives.
///
/// ```yaml
/// remote_url: https://archive.ics.uci.edu/ml/machine-learning-databases/00502/online_retail_II.xlsx
/// sheet_name: Year 2009-2010
/// cache_path: /srv/retail/data/raw.csv
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    pub remote_url: String,
    pub sheet_name: String,
    pub cache_path: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::for_base_dir(".")
    }
}

impl LoaderConfig {
    /// Defaults with the cache at `<base_dir>/data/raw.csv`.
    pub fn for_base_dir(base_dir: impl AsRef<Path>) -> Self {
        let cache_path = CACHE_RELATIVE_PATH
            .iter()
            .fold(base_dir.as_ref().to_path_buf(), |p, part| p.join(part));
        Self {
            remote_url: REMOTE_FILE.to_string(),
            sheet_name: SHEET_NAME.to_string(),
            cache_path,
        }
    }

    /// Parse YAML; missing keys take their defaults. A relative `cache_path`
    /// is kept as given.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: LoaderConfig = serde_yaml::from_str(text).context("parsing loader config")?;
        config.check()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading loader config {}", path.display()))?;
        Self::from_yaml_str(&text)
    }

    fn check(&self) -> Result<()> {
        Url::parse(&self.remote_url)
            .with_context(|| format!("remote_url is not a URL: {}", self.remote_url))?;
        if self.sheet_name.is_empty() {
            anyhow::bail!("sheet_name must not be empty");
        }
        // the cache is read back through the `.csv` path of the loader
        let is_csv = self
            .cache_path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            anyhow::bail!("cache_path must end in .csv: {}", self.cache_path.display());
        }
        Ok(())
    }
}
