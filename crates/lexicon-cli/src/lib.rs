#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Terminal client for the Lexicon glossary backend.
//!
//! Layout:
//! - `cli.rs`: argument parsing, configuration loading and command dispatch
//! - `commands/`: command handlers grouped by screen
//! - `client.rs`: shared HTTP transport and error type
//! - `terminal.rs`: row surface, notifier, confirmer and clipboard adapters
//! - `output.rs`: renderers and formatting helpers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;
pub(crate) mod terminal;

pub use cli::run;
