//! Error types for HTTP store operations.

use thiserror::Error;

/// Errors that can occur while talking to the task backend.
#[derive(Error, Debug)]
pub enum HttpStoreError {
    /// Configured base URL cannot be parsed.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// Connection, timeout, or other transport failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Response body is not the expected JSON.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}
