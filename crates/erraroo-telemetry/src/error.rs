//! Delivery error types

use thiserror::Error;

/// Errors raised while delivering a report
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The request could not be sent or its body could not be read
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON
    #[error("Invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}
