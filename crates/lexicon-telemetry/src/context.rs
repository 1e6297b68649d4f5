//! Span helpers for command-scoped logging.
//!
//! # Design
//! - Every CLI command runs inside one span carrying the command name and build label.
//! - Futures are instrumented rather than entered so the span follows the task across awaits.

use std::future::Future;

use tracing::{Instrument, Span};

use crate::init::build_label;

/// Build the span a command runs in.
#[must_use]
pub fn command_span(command: &str) -> Span {
    tracing::info_span!("command", name = %command, build = %build_label())
}

/// Run `fut` with the command span attached.
pub async fn in_command_span<Fut, T>(command: &str, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    fut.instrument(command_span(command)).await
}
