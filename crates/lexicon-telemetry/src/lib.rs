#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
//! Logging primitives shared by the Lexicon native tools.
//!
//! The browser shell logs through the console; every native binary installs
//! its subscriber through [`init_logging`] so the CLI and test harnesses emit
//! the same fields in either pretty or JSON form.

pub mod context;
pub mod error;
pub mod init;

pub use context::{command_span, in_command_span};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_label, init_logging};
