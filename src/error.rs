//! Error types for the review API boundary.

use thiserror::Error;

/// Failure of a single outbound request to the review API.
///
/// The page fetcher never lets these escape; it logs them and turns the
/// page into an empty result (see [`crate::coupang::PageOutcome`]).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, timeout or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] wreq::Error),

    /// The upstream answered with a status that usually means we are being blocked.
    #[error("rate limited or blocked (status {status})")]
    RateLimited { status: u16 },

    /// Any other non-success status.
    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    /// The body was not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure of one fetch-and-parse attempt for a page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The listing path was present but its records did not have the expected shape.
    #[error("unexpected review listing shape: {0}")]
    Malformed(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_display() {
        let err = FetchError::RateLimited { status: 429 };
        assert_eq!(err.to_string(), "rate limited or blocked (status 429)");
    }

    #[test]
    fn test_status_display() {
        let err = FetchError::Status { status: 500, url: "https://x/next-api/review".to_string() };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("https://x/next-api/review"));
    }

    #[test]
    fn test_decode_from_serde() {
        let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = FetchError::from(source);
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn test_page_error_wraps_fetch() {
        let err = PageError::from(FetchError::RateLimited { status: 503 });
        assert_eq!(err.to_string(), "rate limited or blocked (status 503)");
    }
}
