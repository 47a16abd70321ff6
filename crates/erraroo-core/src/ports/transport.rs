//! Report transport port (driven/secondary port)
//!
//! Defines the wire envelope and the interface used to deliver it.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because delivery failures are adapter-specific.
//! - Callers treat delivery as fire-and-forget; the result is only logged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::SessionId;

/// Client name sent in every envelope. The receiving service groups
/// reports by this name, so it matches the browser add-on's.
pub const CLIENT_NAME: &str = "ember-cli-erraroo";

/// Discriminates payload semantics for the receiving service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    #[serde(rename = "js.error")]
    Error,
    #[serde(rename = "js.timing")]
    Timing,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Error => "js.error",
            ReportKind::Timing => "js.timing",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting client identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

impl ClientInfo {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            name: CLIENT_NAME.to_string(),
            version: version.into(),
        }
    }
}

/// The exact wire payload of every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub client: ClientInfo,
    pub data: Value,
    pub kind: ReportKind,
    pub session: SessionId,
}

/// Port trait for delivering envelopes to the collection endpoint
#[async_trait::async_trait]
pub trait ReportTransport: Send + Sync {
    /// Delivers one envelope and returns the decoded JSON response.
    async fn deliver(&self, envelope: &ReportEnvelope) -> anyhow::Result<Value>;
}
