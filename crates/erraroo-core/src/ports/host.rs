//! Host context port (driven/secondary port)
//!
//! Read-only facts about the environment the reporter runs in. Every error
//! report carries a fresh read of these values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A plugin as the host runtime describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,
    pub description: String,
    pub filename: String,
    pub mime_types: Vec<String>,
}

/// The part of a [`Plugin`] that is shipped with reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
}

impl From<&Plugin> for PluginInfo {
    fn from(plugin: &Plugin) -> Self {
        Self {
            name: plugin.name.clone(),
            description: plugin.description.clone(),
        }
    }
}

/// Reduces the full plugin list to `{name, description}` pairs.
pub fn normalized_plugins(plugins: &[Plugin]) -> Vec<PluginInfo> {
    plugins.iter().map(PluginInfo::from).collect()
}

/// A library registered with the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
}

/// Port trait for reading host metadata attached to error reports
///
/// ## Implementation Notes
///
/// - Values are read on every report, so implementations should be cheap.
/// - Missing values are reported as `None` and serialize to `null`.
pub trait HostContext: Send + Sync {
    /// Preferred language of the user, e.g. `en-US`
    fn language(&self) -> Option<String>;

    /// User agent string
    fn user_agent(&self) -> Option<String>;

    /// Full plugin list; reduced before shipping
    fn plugins(&self) -> Vec<Plugin> {
        Vec::new()
    }

    /// Libraries registered with the host application
    fn libraries(&self) -> Vec<LibraryInfo> {
        Vec::new()
    }

    /// Current page/location URL
    fn current_url(&self) -> Option<String>;
}

/// Port trait for reading navigation timing measurements
pub trait TimingSource: Send + Sync {
    /// Returns the opaque timing object shipped as a `js.timing` report
    fn get_times(&self) -> Value;
}

/// A [`HostContext`] with fixed values, for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct StaticHostContext {
    pub language: Option<String>,
    pub user_agent: Option<String>,
    pub plugins: Vec<Plugin>,
    pub libraries: Vec<LibraryInfo>,
    pub url: Option<String>,
}

impl HostContext for StaticHostContext {
    fn language(&self) -> Option<String> {
        self.language.clone()
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn plugins(&self) -> Vec<Plugin> {
        self.plugins.clone()
    }

    fn libraries(&self) -> Vec<LibraryInfo> {
        self.libraries.clone()
    }

    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }
}
