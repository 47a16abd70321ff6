//! Configuration module for the Erraroo reporter.
//!
//! The host hands us a [`HostEnvironment`]: its own environment name plus an
//! optional `erraroo` block of [`ReporterOptions`]. Activation merges those
//! options over the [`ReporterConfig`] defaults; the result is read-only for
//! the rest of the process lifetime.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::SessionId;

/// Default collection endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.erraroo.com/api/v1/events";

// ---------------------------------------------------------------------------
// Host environment
// ---------------------------------------------------------------------------

/// The host application's environment, as loaded from its config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostEnvironment {
    /// The host's declared environment name, e.g. `production`.
    #[serde(default)]
    pub environment: String,
    /// Reporter block. Capture never activates without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub erraroo: Option<ReporterOptions>,
}

impl HostEnvironment {
    /// Creates an environment with no reporter block.
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            erraroo: None,
        }
    }

    /// Attaches a reporter block
    pub fn with_options(mut self, options: ReporterOptions) -> Self {
        self.erraroo = Some(options);
        self
    }

    /// Load the host environment from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let env: HostEnvironment = serde_yaml::from_str(&content)?;
        Ok(env)
    }
}

/// Caller-supplied reporter options. Every field is optional; set fields
/// win over the defaults when merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterOptions {
    pub endpoint: Option<String>,
    pub environment: Option<String>,
    pub token: Option<String>,
    pub debug: Option<bool>,
    pub enabled: Option<bool>,
    #[serde(alias = "collectTimingData")]
    pub collect_timing_data: Option<bool>,
    pub userdata: Option<Value>,
    #[serde(alias = "installRouteHandler")]
    pub install_route_handler: Option<bool>,
    pub version: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved reporter configuration
// ---------------------------------------------------------------------------

/// Resolved reporter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Collection endpoint receiving every report.
    pub endpoint: String,
    /// Environment label of the reporter itself.
    pub environment: String,
    /// Project token sent as `X-Token`.
    pub token: Option<String>,
    /// Echo diagnostic log entries and delivery failures locally.
    pub debug: bool,
    /// Send one `js.timing` report shortly after install.
    pub collect_timing_data: bool,
    /// Derived by the gate decision during activation.
    pub enabled: bool,
    /// Derived during activation.
    pub session_id: Option<SessionId>,
    /// Arbitrary data attached to every error report.
    pub userdata: Option<Value>,
    /// Wrap the host's application route error handler.
    pub install_route_handler: bool,
    /// Client version reported in the envelope.
    pub version: String,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            environment: "production".to_string(),
            token: None,
            debug: false,
            collect_timing_data: true,
            enabled: false,
            session_id: None,
            userdata: None,
            install_route_handler: true,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ReporterConfig {
    /// Overlays every option that is set onto this configuration.
    pub fn merge(&mut self, options: &ReporterOptions) {
        if let Some(endpoint) = &options.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(environment) = &options.environment {
            self.environment = environment.clone();
        }
        if let Some(token) = &options.token {
            self.token = Some(token.clone());
        }
        if let Some(debug) = options.debug {
            self.debug = debug;
        }
        if let Some(enabled) = options.enabled {
            self.enabled = enabled;
        }
        if let Some(collect) = options.collect_timing_data {
            self.collect_timing_data = collect;
        }
        if let Some(userdata) = &options.userdata {
            self.userdata = Some(userdata.clone());
        }
        if let Some(install) = options.install_route_handler {
            self.install_route_handler = install;
        }
        if let Some(version) = &options.version {
            self.version = version.clone();
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field, e.g. `"endpoint"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ReporterConfig {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        match url::Url::parse(&self.endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError {
                field: "endpoint".into(),
                message: format!("unsupported scheme '{}'; expected http or https", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError {
                field: "endpoint".into(),
                message: format!("invalid url '{}': {e}", self.endpoint),
            }),
        }

        if self.token.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.push(ValidationError {
                field: "token".into(),
                message: "must not be empty".into(),
            });
        }

        if self.version.is_empty() {
            errors.push(ValidationError {
                field: "version".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ReporterConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`ReporterConfig`] programmatically.
///
/// Starts from [`ReporterConfig::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust
/// use erraroo_core::config::ReporterConfigBuilder;
///
/// let config = ReporterConfigBuilder::new()
///     .token("abc")
///     .endpoint("http://localhost:3000/api/v1/events")
///     .debug(true)
///     .build();
/// assert!(config.debug);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReporterConfigBuilder {
    config: ReporterConfig,
}

impl ReporterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.config.environment = environment.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    pub fn collect_timing_data(mut self, collect: bool) -> Self {
        self.config.collect_timing_data = collect;
        self
    }

    pub fn userdata(mut self, userdata: Value) -> Self {
        self.config.userdata = Some(userdata);
        self
    }

    pub fn install_route_handler(mut self, install: bool) -> Self {
        self.config.install_route_handler = install;
        self
    }

    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.config.session_id = Some(session_id);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Consume the builder and return the configuration.
    pub fn build(self) -> ReporterConfig {
        self.config
    }
}
