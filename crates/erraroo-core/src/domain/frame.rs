//! Stack frame normalization
//!
//! Stack-trace extraction hands us frame candidates of varying quality.
//! Cross-origin and minified scripts frequently produce frames without a
//! url or without position data; those are useless for symbolication and
//! are dropped rather than repaired.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A stack frame candidate as produced by the stack-trace extractor.
///
/// Every field is optional. Unknown keys are ignored on deserialization and
/// a field of the wrong type reads as absent, so a malformed frame is
/// rejected by [`normalize_frame`] instead of failing the whole error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFrame {
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_integer")]
    pub line: Option<i64>,
    #[serde(deserialize_with = "lenient_integer")]
    pub column: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub func: Option<String>,
}

impl From<Value> for RawFrame {
    /// Anything that is not a frame-shaped object becomes an empty frame.
    fn from(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        _ => None,
    })
}

/// Reads a stack leniently: every element becomes a [`RawFrame`], and a
/// stack that is not an array reads as absent.
pub(crate) fn lenient_stack<'de, D>(deserializer: D) -> Result<Option<Vec<RawFrame>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(frames) => Some(frames.into_iter().map(RawFrame::from).collect()),
        _ => None,
    })
}

impl RawFrame {
    /// Creates a frame candidate with all positional fields present.
    pub fn new(url: impl Into<String>, line: i64, column: i64) -> Self {
        Self {
            url: Some(url.into()),
            line: Some(line),
            column: Some(column),
            func: None,
        }
    }

    /// Sets the function name
    pub fn with_func(mut self, func: impl Into<String>) -> Self {
        self.func = Some(func.into());
        self
    }
}

/// A validated stack frame that is safe to transmit.
///
/// `url` is never empty, `line` and `column` are always positive.
/// Field order matches the wire format: `column`, `func`, `line`, `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub column: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub func: Option<String>,
    pub line: u64,
    pub url: String,
}

impl From<StackFrame> for RawFrame {
    fn from(frame: StackFrame) -> Self {
        Self {
            url: Some(frame.url),
            line: i64::try_from(frame.line).ok(),
            column: i64::try_from(frame.column).ok(),
            func: frame.func,
        }
    }
}

/// Validates a single frame candidate.
///
/// Returns `None` when the url is missing or empty, or when the line or
/// column is missing or not a positive number. Otherwise the four fields
/// are copied as-is.
pub fn normalize_frame(frame: &RawFrame) -> Option<StackFrame> {
    let url = frame.url.as_deref().filter(|u| !u.is_empty())?;
    let column = positive(frame.column)?;
    let line = positive(frame.line)?;

    Some(StackFrame {
        column,
        func: frame.func.clone(),
        line,
        url: url.to_string(),
    })
}

/// Normalizes a whole stack, keeping accepted frames in their original order.
pub fn normalize_stack(frames: &[RawFrame]) -> Vec<StackFrame> {
    frames.iter().filter_map(normalize_frame).collect()
}

fn positive(value: Option<i64>) -> Option<u64> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u64::try_from(v).ok())
}
