//! HTTP delivery of report envelopes
//!
//! Every envelope is an independent `POST` to the configured endpoint with
//! the project token in `X-Token`. No retries and no queuing.

use anyhow::Context;
use erraroo_core::{
    config::ReporterConfig,
    ports::{ReportEnvelope, ReportTransport},
};
use reqwest::{header, Client};
use serde_json::Value;
use tracing::debug;

use crate::error::TelemetryError;

/// Header carrying the project token
pub const TOKEN_HEADER: &str = "X-Token";

/// reqwest-backed [`ReportTransport`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpTransport {
    /// Creates a transport posting to `endpoint` with `token`.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// Creates a transport from an activated configuration.
    pub fn from_config(config: &ReporterConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.token.clone().unwrap_or_default(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts `envelope` and decodes the JSON response.
    ///
    /// An empty response body decodes to `null`.
    pub async fn post(&self, envelope: &ReportEnvelope) -> Result<Value, TelemetryError> {
        debug!(endpoint = %self.endpoint, kind = %envelope.kind, "Posting report");

        let response = self
            .client
            .post(&self.endpoint)
            .header(TOKEN_HEADER, &self.token)
            .header(header::ACCEPT, "application/json")
            .json(envelope)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelemetryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait::async_trait]
impl ReportTransport for HttpTransport {
    async fn deliver(&self, envelope: &ReportEnvelope) -> anyhow::Result<Value> {
        self.post(envelope)
            .await
            .with_context(|| format!("Failed to deliver {} report to {}", envelope.kind, self.endpoint))
    }
}
