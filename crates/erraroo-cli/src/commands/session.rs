//! Session command - Mint a session id
//!
//! Prints an id in the same format the reporter attaches to every envelope.

use anyhow::Result;
use clap::Args;
use erraroo_core::domain::SessionId;
use serde::Serialize;

use crate::output::{render, Line, OutputFormat, Outcome};

#[derive(Debug, Args)]
pub struct SessionCommand {}

#[derive(Debug, Serialize)]
pub struct SessionOutcome {
    pub session: SessionId,
}

impl Outcome for SessionOutcome {
    fn lines(&self) -> Vec<Line> {
        vec![Line::Success(self.session.to_string())]
    }
}

impl SessionCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        render(
            format,
            &SessionOutcome {
                session: SessionId::new(),
            },
        )
    }
}
