//! Reporting client
//!
//! Wraps payloads in the [`ReportEnvelope`] and hands them to a
//! [`ReportTransport`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use erraroo_core::{config::ReporterConfigBuilder, domain::SessionId, ports::ReportKind};
//! use erraroo_telemetry::{HttpTransport, ReportingClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ReporterConfigBuilder::new().token("abc").build();
//! let transport = Arc::new(HttpTransport::from_config(&config));
//! let client = ReportingClient::new(&config, SessionId::new(), transport);
//! client.deliver(ReportKind::Timing, serde_json::json!({"load": 120})).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use erraroo_core::{
    config::ReporterConfig,
    domain::SessionId,
    ports::{ClientInfo, ReportEnvelope, ReportKind, ReportTransport},
};
use serde_json::Value;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, warn};

/// Builds envelopes for one session and delivers them.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ReportingClient {
    transport: Arc<dyn ReportTransport>,
    client: ClientInfo,
    session: SessionId,
    debug: bool,
}

impl ReportingClient {
    /// Creates a client that reports every envelope under `session`.
    pub fn new(
        config: &ReporterConfig,
        session: SessionId,
        transport: Arc<dyn ReportTransport>,
    ) -> Self {
        Self {
            transport,
            client: ClientInfo::new(config.version.clone()),
            session,
            debug: config.debug,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Wraps `data` in the wire envelope.
    pub fn envelope(&self, kind: ReportKind, data: Value) -> ReportEnvelope {
        ReportEnvelope {
            client: self.client.clone(),
            data,
            kind,
            session: self.session,
        }
    }

    /// Delivers one report and waits for the response.
    pub async fn deliver(&self, kind: ReportKind, data: Value) -> anyhow::Result<Value> {
        let envelope = self.envelope(kind, data);
        self.transport.deliver(&envelope).await
    }

    /// Fire-and-forget delivery.
    ///
    /// The request runs as a spawned task; failures are logged and never
    /// returned. Returns `None` when called outside a tokio runtime, in
    /// which case the report is dropped.
    pub fn send(&self, kind: ReportKind, data: Value) -> Option<JoinHandle<()>> {
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(%kind, "No async runtime available, report dropped");
                return None;
            }
        };

        let envelope = self.envelope(kind, data);
        let transport = Arc::clone(&self.transport);
        let debug_enabled = self.debug;

        Some(handle.spawn(async move {
            match transport.deliver(&envelope).await {
                Ok(_) => debug!(kind = %envelope.kind, "Report delivered"),
                Err(e) if debug_enabled => {
                    warn!(kind = %envelope.kind, error = %format!("{e:#}"), "Report delivery failed")
                }
                Err(e) => {
                    debug!(kind = %envelope.kind, error = %format!("{e:#}"), "Report delivery failed")
                }
            }
        }))
    }
}

impl std::fmt::Debug for ReportingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportingClient")
            .field("client", &self.client)
            .field("session", &self.session)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
