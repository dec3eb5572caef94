//! HTTP retrieval of remote GeoJSON documents

use anyhow::Result;
use geovalid_core::error::Error;
use geovalid_core::normalize::{GeoJsonInput, RemoteFetcher};
use serde_json::Value;
use std::time::Duration;
use tokio::runtime::Runtime;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches documents with reqwest on a private runtime
pub struct HttpFetcher {
    runtime: Runtime,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { runtime, client })
    }

    /// A fetcher for URL inputs; other inputs never need one
    pub fn for_input(input: &GeoJsonInput) -> Result<Option<Self>> {
        match input {
            GeoJsonInput::Url(_) => Ok(Some(Self::new()?)),
            _ => Ok(None),
        }
    }

    async fn get(&self, url: &str) -> reqwest::Result<Value> {
        self.client.get(url).send().await?.error_for_status()?.json::<Value>().await
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> geovalid_core::Result<Value> {
        self.runtime
            .block_on(self.get(url))
            .map_err(|e| Error::Fetch { url: url.to_string(), reason: e.to_string() })
    }
}

/// Borrow an optional fetcher as the port type
pub fn as_port(fetcher: &Option<HttpFetcher>) -> Option<&dyn RemoteFetcher> {
    fetcher.as_ref().map(|f| f as &dyn RemoteFetcher)
}
