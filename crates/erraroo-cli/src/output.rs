//! Command output
//!
//! Every command produces one serializable outcome. JSON mode prints it
//! as-is; human mode prints its [`Line`]s, diagnostics on stderr.

use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// One line of human-readable output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Success(String),
    Warning(String),
    Failure(String),
    /// Indented supporting detail under the previous line
    Detail(String),
}

impl Line {
    fn is_diagnostic(&self) -> bool {
        matches!(self, Line::Warning(_) | Line::Failure(_))
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Success(msg) => write!(f, "\u{2713} {msg}"),
            Line::Warning(msg) => write!(f, "\u{26a0} Warning: {msg}"),
            Line::Failure(msg) => write!(f, "\u{2717} Error: {msg}"),
            Line::Detail(msg) => write!(f, "  {msg}"),
        }
    }
}

/// A command result that can be printed in either format.
pub trait Outcome: Serialize {
    fn lines(&self) -> Vec<Line>;
}

/// Prints `outcome` in `format`.
pub fn render<T: Outcome>(format: OutputFormat, outcome: &T) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(outcome).context("Failed to serialize output")?;
            println!("{json}");
        }
        OutputFormat::Human => {
            for line in outcome.lines() {
                if line.is_diagnostic() {
                    eprintln!("{line}");
                } else {
                    println!("{line}");
                }
            }
        }
    }
    Ok(())
}
