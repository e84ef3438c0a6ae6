//! Dataset cache
//!
//! The dataset does not change during a session, so the normalized records
//! are kept after the first successful load. Layout passes (resize) reuse
//! them; only an explicit reload drops the cache. A failed load caches
//! nothing, which makes the next pass retry the fetch.

use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::LoadResult;
use super::normalize::normalize;
use super::source::{FileSource, HttpSource};
use super::types::RaceRecord;
use super::DatasetSource;
use crate::config::DatasetConfig;

/// Cached access to a dataset source
pub struct Loader {
    source: Arc<dyn DatasetSource>,
    cached: RwLock<Option<Arc<[RaceRecord]>>>,
}

impl Loader {
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        Self {
            source,
            cached: RwLock::new(None),
        }
    }

    /// Loader for the configured source; a local file wins over the URL
    pub fn from_config(config: &DatasetConfig) -> LoadResult<Self> {
        let source: Arc<dyn DatasetSource> = match &config.file {
            Some(path) => Arc::new(FileSource::new(path.clone())),
            None => Arc::new(HttpSource::new(config.url.clone(), config.request_timeout())?),
        };
        Ok(Self::new(source))
    }

    /// Name of the underlying source
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Normalized records, fetching them if nothing is cached
    pub async fn records(&self) -> LoadResult<Arc<[RaceRecord]>> {
        if let Some(records) = self.cached.read().await.as_ref() {
            tracing::debug!(records = records.len(), "Dataset cache hit");
            return Ok(Arc::clone(records));
        }

        let raw = self.source.fetch().await?;
        let records: Arc<[RaceRecord]> = normalize(raw)?.into();

        tracing::info!(
            source = self.source.name(),
            records = records.len(),
            "Dataset loaded"
        );

        *self.cached.write().await = Some(Arc::clone(&records));
        Ok(records)
    }

    /// Drop the cached records; the next call to [`Loader::records`] refetches
    pub async fn invalidate(&self) {
        if self.cached.write().await.take().is_some() {
            tracing::debug!("Dataset cache invalidated");
        }
    }

    /// Cached records without triggering a fetch
    pub async fn cached(&self) -> Option<Arc<[RaceRecord]>> {
        self.cached.read().await.clone()
    }
}
