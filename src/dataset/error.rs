//! Dataset error types
//!
//! Everything that can go wrong between the dataset endpoint and a
//! normalized record set.

use thiserror::Error;

/// Errors that can occur while loading the race dataset
#[derive(Error, Debug)]
pub enum LoadError {
    /// Transport failure (connect, timeout, TLS, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Dataset endpoint {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Payload is not a JSON array of race records
    #[error("Malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// Local dataset file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record's `Time` field is not "MM:SS"
    #[error("Invalid time {value:?} for {name}")]
    InvalidTime { name: String, value: String },

    /// A record's `Year` field does not map to a calendar date
    #[error("Invalid year {year} for {name}")]
    InvalidYear { name: String, year: i32 },
}

/// Result type alias for dataset operations
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::InvalidTime {
            name: "Marco Pantani".to_string(),
            value: "36".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid time \"36\" for Marco Pantani");

        let err = LoadError::Status {
            url: "http://localhost/data.json".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Dataset endpoint http://localhost/data.json returned status 404"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u32>>("not json").unwrap_err();
        let err: LoadError = json_err.into();
        assert!(matches!(err, LoadError::Parse(_)));
    }
}
