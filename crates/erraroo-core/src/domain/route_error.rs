//! Route-transition failures
//!
//! A route error is either an HTTP-like failure (`status` plus response
//! text) or a data-adapter failure carrying a list of nested errors. Both
//! are reduced to a [`CapturedError`] before reporting.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error_report::CapturedError;

/// Message the data adapter uses for failed operations
pub const ADAPTER_FAILURE_MESSAGE: &str = "Adapter operation failed";

/// One nested error of an adapter failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterError {
    pub title: Option<String>,
    pub detail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdapterError {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            detail: Some(detail.into()),
            extra: Map::new(),
        }
    }
}

/// An error raised while transitioning between routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteError {
    pub message: Option<String>,
    pub status: Option<i64>,
    #[serde(rename = "responseText")]
    pub response_text: Option<String>,
    pub errors: Vec<AdapterError>,
}

impl RouteError {
    /// An HTTP-like failure with a status code and response body.
    pub fn http(status: i64, response_text: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            response_text: Some(response_text.into()),
            ..Self::default()
        }
    }

    /// A data-adapter failure with nested errors.
    pub fn adapter(errors: Vec<AdapterError>) -> Self {
        Self {
            message: Some(ADAPTER_FAILURE_MESSAGE.to_string()),
            errors,
            ..Self::default()
        }
    }

    /// The synthesized report for an HTTP-like failure, if this is one.
    pub fn http_report(&self) -> Option<CapturedError> {
        let status = self.status.filter(|s| *s >= 400)?;
        Some(CapturedError {
            name: Some(format!("Error {status}")),
            message: self.response_text.clone(),
            ..CapturedError::default()
        })
    }

    /// Whether this is a data-adapter failure.
    pub fn is_adapter_failure(&self) -> bool {
        self.message.as_deref() == Some(ADAPTER_FAILURE_MESSAGE)
    }

    /// The synthesized report for an adapter failure: the title and detail
    /// of the first nested error. Later entries are ignored.
    pub fn adapter_report(&self) -> Option<CapturedError> {
        if !self.is_adapter_failure() {
            return None;
        }

        let first = self.errors.first();
        Some(CapturedError {
            name: first.and_then(|e| e.title.clone()),
            message: first.and_then(|e| e.detail.clone()),
            ..CapturedError::default()
        })
    }
}
