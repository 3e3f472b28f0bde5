//! Error types for cached fetching
//!
//! Every failure a resolution can hit is represented here. The fetcher turns
//! these into the `error` string of its state; nothing propagates past it.

use thiserror::Error;

/// Errors that can occur while resolving a URL
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("HTTP error! status: {status}")]
    HttpError { status: u16 },

    /// The response body was not valid JSON
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// The request was aborted through its cancellation token
    #[error("Request cancelled")]
    Cancelled,

    /// The request could not be sent or the body could not be read
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Request options could not be turned into a request
    #[error("Invalid request options: {0}")]
    InvalidOptions(String),

    /// The session store could not be written
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl FetchError {
    /// Whether this failure came from explicit cancellation and must be swallowed
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message_matches_display_format() {
        let err = FetchError::HttpError { status: 500 };
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn test_only_cancelled_is_cancelled() {
        assert!(FetchError::Cancelled.is_cancelled());
        assert!(!FetchError::HttpError { status: 404 }.is_cancelled());
        assert!(!FetchError::InvalidOptions("bad".to_string()).is_cancelled());
    }

    #[test]
    fn test_parse_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FetchError = serde_err.into();
        assert!(matches!(err, FetchError::ParseError(_)));
        assert!(err.to_string().starts_with("Failed to parse JSON response"));
    }
}
