//! Typed errors returned by the API client.

use std::time::Duration;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The client was created without an API key.
    NoApiKey,
    /// The request URL could not be assembled.
    InvalidUrl,
    /// The endpoint answered with HTTP 404.
    NotFound,
    /// The response body did not match the expected JSON shape.
    MappingFailed,
    /// The request never produced a response.
    ConnectionError,
    /// The vendor reported a failure.
    ApiError,
    /// A client setting or request parameter was rejected.
    InvalidParameter,
}

/// Errors produced by [`crate::rottentomatoes::RtClient`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No (or a blank) API key was supplied.
    #[error("no API key provided")]
    NoApiKey,

    /// URL assembly failed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP 404 from the vendor.
    #[error("resource not found: {path}")]
    NotFound {
        /// Endpoint path that was requested.
        path: String,
    },

    /// JSON decoding failed.
    #[error("failed to map response from {path}")]
    MappingFailed {
        /// Endpoint path that was requested.
        path: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Transport-level failure.
    #[error("request failed: {path}")]
    Connection {
        /// Endpoint path that was requested.
        path: String,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status without a readable vendor error.
    #[error("HTTP {status} from {path}: {body}")]
    Http {
        /// Endpoint path that was requested.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// Non-blank `error` field in the response body.
    #[error("Rotten Tomatoes API error: {0}")]
    Api(String),

    /// The per-second query limit was still hit after every retry.
    #[error("query limit exceeded after {retries} retries (last delay {last_delay:?})")]
    QueryLimitExceeded {
        /// Number of retries performed.
        retries: u32,
        /// Delay slept before the final attempt.
        last_delay: Duration,
    },

    /// Rejected client setting or request parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoApiKey => ErrorKind::NoApiKey,
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MappingFailed { .. } => ErrorKind::MappingFailed,
            Self::Connection { .. } => ErrorKind::ConnectionError,
            Self::Http { .. } | Self::Api(_) | Self::QueryLimitExceeded { .. } => {
                ErrorKind::ApiError
            }
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
