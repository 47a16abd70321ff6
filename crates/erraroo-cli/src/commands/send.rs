//! Send command - Deliver one error report
//!
//! Reads a captured error from a JSON file, runs it through the same
//! pipeline the capture controller uses, and waits for the endpoint's
//! response instead of sending fire-and-forget.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Args;
use erraroo_capture::{CaptureController, ControllerState};
use erraroo_core::{
    config::HostEnvironment,
    domain::{CapturedError, LogBuffer, SessionId},
    ports::ReportKind,
};
use erraroo_telemetry::SystemContext;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::output::{render, Line, OutputFormat, Outcome};

/// Name this tool registers under `libaries` in every report
pub const LIBRARY_NAME: &str = "erraroo-cli";

#[derive(Debug, Args)]
pub struct SendCommand {
    /// JSON file holding the error (`message`, `name`, `stack`)
    #[arg(long)]
    pub error: PathBuf,

    /// Send even when capture is disabled in this environment
    #[arg(long)]
    pub force: bool,
}

/// Reads a captured error from `path`.
pub fn read_error(path: &Path) -> Result<CapturedError> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read error file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse error file {}", path.display()))
}

/// A delivered report and the endpoint's response
#[derive(Debug, Serialize)]
pub struct SendOutcome {
    pub session: SessionId,
    pub response: Value,
}

impl Outcome for SendOutcome {
    fn lines(&self) -> Vec<Line> {
        let mut lines = vec![Line::Success(format!(
            "Report delivered (session {})",
            self.session
        ))];
        if !self.response.is_null() {
            let body = serde_json::to_string_pretty(&self.response)
                .unwrap_or_else(|_| self.response.to_string());
            lines.extend(body.lines().map(|l| Line::Detail(l.to_string())));
        }
        lines
    }
}

/// Host context for reports sent from this tool.
pub fn host_context() -> SystemContext {
    SystemContext::collect().with_library(LIBRARY_NAME, env!("CARGO_PKG_VERSION"))
}

impl SendCommand {
    pub async fn execute(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let env = HostEnvironment::load(config_path).with_context(|| {
            format!("Failed to load host environment from {}", config_path.display())
        })?;
        let error = read_error(&self.error)?;

        let mut controller =
            CaptureController::new(LogBuffer::new(), Arc::new(host_context()));
        let state = controller.before_initialize(&env);

        if state == ControllerState::Gated && !self.force {
            anyhow::bail!(
                "Capture is not enabled in '{}'; run `erraroo check` for details or pass --force",
                env.environment
            );
        }

        let client = controller
            .client()
            .cloned()
            .context("Erraroo is not configured; run `erraroo check` for details")?;

        let payload = controller
            .error_payload(error)
            .context("Error file has no message, nothing to send")?;
        let data = serde_json::to_value(&payload).context("Failed to encode error report")?;

        info!(session = %client.session(), "Sending error report");
        let response = client.deliver(ReportKind::Error, data).await?;

        render(
            format,
            &SendOutcome {
                session: client.session(),
                response,
            },
        )
    }
}
