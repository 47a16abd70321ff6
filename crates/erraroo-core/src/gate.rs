//! Activation and the enabled/disabled gate
//!
//! Activation happens once, before anything subscribes to error sources.
//! Capture is on by default only in production; anywhere else it needs an
//! explicit `enabled: true`.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::{HostEnvironment, ReporterConfig, ValidationError},
    domain::SessionId,
};

/// Environment name in which capture is enabled without an explicit opt-in
pub const PRODUCTION: &str = "production";

/// Reasons activation stops before capture can run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The host environment has no `erraroo` block
    #[error("No erraroo configuration block in the host environment")]
    MissingBlock,

    /// The block carries no project token
    #[error("Please set your project token: erraroo: {{ token: 'xxx' }} in the host environment")]
    MissingToken,

    /// The merged configuration failed validation
    #[error("Invalid erraroo configuration: {}", join(.0))]
    Invalid(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Settings handed to the stack-capture mechanism after activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    /// Fetch remote sources to enrich frames. Always off.
    pub remote_fetching: bool,
    /// Collect global uncaught errors. Mirrors `enabled`.
    pub collect_window_errors: bool,
}

/// Result of a completed activation.
#[derive(Debug, Clone)]
pub struct Activation {
    pub config: ReporterConfig,
    pub capture: CaptureSettings,
    /// The one session id for everything reported under this activation
    pub session: SessionId,
}

impl Activation {
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Session id minted during activation
    pub fn session_id(&self) -> SessionId {
        self.session
    }
}

/// Decides whether capture is active.
///
/// An explicit `enabled` in the configuration always wins; otherwise
/// capture runs only when the host environment is `production`.
pub fn is_enabled(config: &ReporterConfig, env: &HostEnvironment) -> bool {
    config.enabled || env.environment == PRODUCTION
}

/// Runs the activation sequence against the host environment.
///
/// 1. No reporter block: stop.
/// 2. No token: stop.
/// 3. Merge options over defaults and validate.
/// 4. Decide `enabled`.
/// 5. Mint a session id.
/// 6. Derive the stack-capture settings.
pub fn activate(env: &HostEnvironment) -> Result<Activation, ConfigError> {
    let options = env.erraroo.as_ref().ok_or(ConfigError::MissingBlock)?;

    if options.token.is_none() {
        return Err(ConfigError::MissingToken);
    }

    let mut config = ReporterConfig::default();
    config.merge(options);

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Invalid(errors));
    }

    config.enabled = is_enabled(&config, env);
    let session_id = SessionId::new();
    config.session_id = Some(session_id);

    let capture = CaptureSettings {
        remote_fetching: false,
        collect_window_errors: config.enabled,
    };

    info!(
        enabled = config.enabled,
        environment = %env.environment,
        session = %session_id,
        "Erraroo activated"
    );

    Ok(Activation {
        config,
        capture,
        session: session_id,
    })
}

/// Like [`activate`], but logs configuration problems instead of
/// returning them. `None` means capture stays off.
pub fn activate_or_warn(env: &HostEnvironment) -> Option<Activation> {
    match activate(env) {
        Ok(activation) => Some(activation),
        Err(ConfigError::MissingBlock) => {
            debug!("No erraroo configuration found, capture disabled");
            None
        }
        Err(e) => {
            warn!(error = %e, "Erraroo not activated");
            None
        }
    }
}
