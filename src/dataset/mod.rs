//! Race Dataset
//!
//! Loading and normalization of the cycling results the chart plots:
//! - `HttpSource` (remote JSON endpoint)
//! - `FileSource` (local copy of the payload)
//! - `StaticSource` (in-memory payload)
//!
//! The [`Loader`] wraps a source with a cache so that layout passes do not
//! repeat the network call.

mod cache;
mod error;
mod normalize;
mod source;
mod types;

pub use cache::Loader;
pub use error::{LoadError, LoadResult};
pub use normalize::{format_time, normalize, normalize_record, parse_time, year_value, TIME_FORMAT};
pub use source::{FileSource, HttpSource, StaticSource};
pub use types::{Category, RaceRecord, RawRecord};

use async_trait::async_trait;

/// Default public location of the dataset
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/freeCodeCamp/ProjectReferenceData/master/cyclist-data.json";

/// Common trait for everything that can produce the raw payload
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Retrieve and parse the raw records
    async fn fetch(&self) -> LoadResult<Vec<RawRecord>>;
}
