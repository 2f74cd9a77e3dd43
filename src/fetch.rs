// src/fetch.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fetch the full body behind a URL.
pub trait Fetch {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// Plain HTTP(S) GET with a blocking reqwest client. Non-success statuses
/// are errors; there is no retry and no request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// The workbook is tens of megabytes, so the blocking client's default
    /// 30 s total timeout is switched off.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("building HTTP client")?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        debug!(%url, "fetching");
        let bytes = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .bytes()
            .with_context(|| format!("Reading body from {}", url))?;
        debug!(%url, bytes = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }
}
