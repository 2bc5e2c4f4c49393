//! Error type definitions for the subscription aggregator
//!
//! Per-source fetch failures are represented by [`SourceError`] and never
//! escape the ingestion pipeline; a failed source degrades to an empty
//! contribution. [`AppError`] covers the caller-facing surface
//! (configuration loading, HTTP client construction).

use thiserror::Error;

/// Convenience result alias for application-level operations
pub type AppResult<T> = Result<T, AppError>;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error with the given message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Per-source fetch errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Request or body read exceeded the configured timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Non-success HTTP status from the source
    #[error("HTTP error: {status} from {url}")]
    Http { status: u16, url: String },

    /// Transport-level failure (DNS, connect, protocol)
    #[error("Network error on {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Source URL is not syntactically valid
    #[error("Invalid source URL: {url} - {message}")]
    InvalidUrl { url: String, message: String },
}

impl SourceError {
    /// Classify a `reqwest` error for the given source URL
    pub fn from_request(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source: error,
            }
        }
    }
}
