//! Captured errors and their transport-safe form
//!
//! A [`CapturedError`] is whatever the host handed us: a message, maybe a
//! name, maybe a stack of frame candidates, plus any other keys. An
//! [`ErrorReport`] is the copy we actually ship, with the stack replaced by
//! its canonical frames.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::DomainError;
use super::frame::{lenient_stack, normalize_stack, RawFrame, StackFrame};

/// An error-like value delivered by one of the host's error sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapturedError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_stack",
        skip_serializing_if = "Option::is_none"
    )]
    pub stack: Option<Vec<RawFrame>>,
    /// Any other keys present on the original error
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CapturedError {
    /// Creates an error with a message and no stack.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Sets the error name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the raw stack
    pub fn with_stack(mut self, stack: Vec<RawFrame>) -> Self {
        self.stack = Some(stack);
        self
    }
}

/// The normalized error carried as `trace` in a `js.error` report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<StackFrame>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TryFrom<CapturedError> for ErrorReport {
    type Error = DomainError;

    fn try_from(error: CapturedError) -> Result<Self, Self::Error> {
        let message = error.message.ok_or(DomainError::MissingMessage)?;
        Ok(Self {
            message,
            name: error.name,
            stack: error.stack.as_deref().map(normalize_stack),
            extra: error.extra,
        })
    }
}

/// Builds the transport-safe copy of `error`.
///
/// A present stack is replaced by its accepted frames in their original
/// order; an absent stack stays absent. Fails only when the error has no
/// message.
pub fn normalize_error(error: CapturedError) -> Result<ErrorReport, DomainError> {
    ErrorReport::try_from(error)
}
