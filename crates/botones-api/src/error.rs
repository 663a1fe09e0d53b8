//! Error types for the botones-api crate.

use thiserror::Error;

/// All errors that can originate from remote API calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The shared HTTP client could not be constructed.
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Transport-level failure: DNS, TLS, connect, or timeout.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status code.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    /// The response body did not match the expected shape.
    #[error("unexpected response from {endpoint}: {detail}")]
    Decode {
        endpoint: &'static str,
        detail: String,
    },

    /// Structured miss: the service answered correctly but holds no result
    /// for the query. The only variant that triggers an alternate retry.
    #[error("{what}")]
    NoMatch { what: String },
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, ApiError>;
