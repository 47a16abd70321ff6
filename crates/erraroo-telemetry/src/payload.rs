//! The `js.error` request body

use erraroo_core::{
    domain::{ErrorReport, LogEntry},
    ports::{normalized_plugins, HostContext, LibraryInfo, PluginInfo},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data shipped with every `js.error` report.
///
/// The receiving service expects the library list under the key
/// `libaries`; the spelling is part of the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub language: Option<String>,
    #[serde(rename = "libaries")]
    pub libraries: Vec<LibraryInfo>,
    pub plugins: Vec<PluginInfo>,
    pub useragent: Option<String>,
    pub userdata: Option<Value>,
    pub url: Option<String>,
    pub trace: ErrorReport,
    pub logs: Vec<LogEntry>,
}

impl ErrorPayload {
    /// Assembles the payload from a fresh read of the host context.
    pub fn collect(
        host: &dyn HostContext,
        userdata: Option<Value>,
        trace: ErrorReport,
        logs: Vec<LogEntry>,
    ) -> Self {
        Self {
            language: host.language(),
            libraries: host.libraries(),
            plugins: normalized_plugins(&host.plugins()),
            useragent: host.user_agent(),
            userdata,
            url: host.current_url(),
            trace,
            logs,
        }
    }
}
