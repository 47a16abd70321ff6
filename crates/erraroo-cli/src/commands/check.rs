//! Check command - Dry-run activation against a host environment file
//!
//! Loads the environment, runs the activation rules and reports:
//! 1. Whether a reporter would be activated at all
//! 2. Whether capture would be enabled in that environment
//! 3. Every configuration problem found

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use erraroo_core::{
    config::HostEnvironment,
    gate::{self, ConfigError},
};
use serde::Serialize;
use tracing::info;

use crate::output::{render, Line, OutputFormat, Outcome};

#[derive(Debug, Args)]
pub struct CheckCommand {}

/// Outcome of a dry-run activation
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub environment: String,
    pub activated: bool,
    pub enabled: bool,
    pub session: Option<String>,
    pub endpoint: Option<String>,
    pub problems: Vec<String>,
}

impl CheckReport {
    pub fn from_environment(env: &HostEnvironment) -> Self {
        let mut report = Self {
            environment: env.environment.clone(),
            activated: false,
            enabled: false,
            session: None,
            endpoint: None,
            problems: Vec::new(),
        };

        match gate::activate(env) {
            Ok(activation) => {
                report.activated = true;
                report.enabled = activation.is_enabled();
                report.session = Some(activation.session_id().to_string());
                report.endpoint = Some(activation.config.endpoint);
            }
            Err(ConfigError::Invalid(errors)) => {
                report.problems = errors.iter().map(ToString::to_string).collect();
            }
            Err(e) => report.problems.push(e.to_string()),
        }

        report
    }
}

impl Outcome for CheckReport {
    fn lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();

        if !self.activated {
            lines.push(Line::Failure(format!(
                "Erraroo would not activate in '{}'",
                self.environment
            )));
            lines.extend(self.problems.iter().cloned().map(Line::Detail));
            return lines;
        }

        if self.enabled {
            lines.push(Line::Success(format!("Capture enabled in '{}'", self.environment)));
        } else {
            lines.push(Line::Warning(format!(
                "Capture disabled in '{}' (set enabled: true to opt in)",
                self.environment
            )));
        }
        if let Some(endpoint) = &self.endpoint {
            lines.push(Line::Detail(format!("Endpoint: {endpoint}")));
        }
        if let Some(session) = &self.session {
            lines.push(Line::Detail(format!("Session:  {session}")));
        }
        lines
    }
}

impl CheckCommand {
    pub async fn execute(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let env = HostEnvironment::load(config_path).with_context(|| {
            format!("Failed to load host environment from {}", config_path.display())
        })?;
        info!(config_path = %config_path.display(), "Checking host environment");

        let report = CheckReport::from_environment(&env);
        render(format, &report)?;

        if !report.activated {
            anyhow::bail!("Erraroo configuration in {} is not usable", config_path.display());
        }
        Ok(())
    }
}
