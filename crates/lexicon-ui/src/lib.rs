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
#![allow(clippy::module_name_repetitions)]
//! Lexicon glossary front-end core.
//!
//! Everything outside `app` is DOM-free and unit-testable on the host:
//! - `selection`: ordered selection keyed by entry identity
//! - `render`: chunked, supersedable table/list renderer over a `RowSurface`
//! - `gateway`: HTTP choke point with envelope normalisation and category cache
//! - `notify`: notification channel with timed dismissal
//! - `pages`: per-screen controllers composing the above
//!
//! The `app` module (wasm32 only) binds the controllers to DOM element ids.

pub mod config;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod pages;
pub mod render;
pub mod selection;
pub mod validate;

pub use config::{CombineSource, ConfigError, FieldLimits, UiConfig};
pub use gateway::{Gateway, RequestError, Transport};
pub use models::{Entry, Field, SelectionKey};
pub use notify::{NotificationCenter, NotificationKind, Notifier};
pub use pages::{Confirmer, Controls, DataRefresh, PageContext, PageError, PagePhase};
pub use render::{IncrementalRenderer, RowSurface, Yielder};
pub use selection::{HeaderState, SelectionModel};
pub use validate::ValidationError;

#[cfg(target_arch = "wasm32")]
mod app;

#[cfg(target_arch = "wasm32")]
pub use app::run_app;
