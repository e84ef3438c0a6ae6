//! Dataset sources
//!
//! One HTTP GET, one file read, or an in-memory payload. No retries.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use super::error::{LoadError, LoadResult};
use super::types::RawRecord;
use super::DatasetSource;

/// Remote JSON endpoint
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Create a source for `url`; `timeout` bounds the whole request
    pub fn new(url: impl Into<String>, timeout: Duration) -> LoadResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Endpoint this source reads from
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self) -> LoadResult<Vec<RawRecord>> {
        tracing::debug!(url = %self.url, "Fetching dataset");

        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        // Read the body first so a malformed payload surfaces as a parse error
        let body = response.bytes().await?;
        let records: Vec<RawRecord> = serde_json::from_slice(&body)?;

        tracing::debug!(url = %self.url, records = records.len(), "Dataset downloaded");
        Ok(records)
    }
}

/// Local copy of the JSON payload
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self) -> LoadResult<Vec<RawRecord>> {
        let content = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&content)?)
    }
}

/// In-memory JSON payload
pub struct StaticSource {
    name: String,
    payload: String,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

#[async_trait]
impl DatasetSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> LoadResult<Vec<RawRecord>> {
        Ok(serde_json::from_str(&self.payload)?)
    }
}
