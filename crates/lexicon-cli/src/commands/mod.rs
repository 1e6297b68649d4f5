//! Command handlers grouped by screen.
//!
//! Each handler drives the same page controller the browser uses, with
//! terminal adapters standing in for the DOM.

pub(crate) mod backup;
pub(crate) mod catalog;
pub(crate) mod combine;
pub(crate) mod editor;
pub(crate) mod entries;

use std::rc::Rc;

use lexicon_ui::config::UiConfig;
use lexicon_ui::gateway::Gateway;
use lexicon_ui::notify::Notifier;
use lexicon_ui::pages::{Confirmer, PageContext};
use lexicon_ui::render::IncrementalRenderer;

use crate::cli::OutputFormat;
use crate::client::ReqwestTransport;
use crate::terminal::{LogControls, StdinConfirmer, TerminalNotifier, TerminalSurface, TokioYielder};

pub(crate) type Api = Gateway<ReqwestTransport>;
pub(crate) type TerminalRenderer = IncrementalRenderer<TerminalSurface, TokioYielder>;

/// Everything a command needs to build its controller.
pub(crate) struct Session {
    pub(crate) gateway: Rc<Api>,
    pub(crate) config: UiConfig,
    pub(crate) output: OutputFormat,
    notifier: Rc<TerminalNotifier>,
    confirmer: Rc<StdinConfirmer>,
}

impl Session {
    pub(crate) fn new(
        gateway: Rc<Api>,
        config: UiConfig,
        output: OutputFormat,
        assume_yes: bool,
        quiet: bool,
    ) -> Self {
        Self {
            gateway,
            config,
            output,
            notifier: Rc::new(TerminalNotifier::new(quiet)),
            confirmer: Rc::new(StdinConfirmer::new(assume_yes)),
        }
    }

    pub(crate) fn context(&self) -> PageContext {
        let notifier: Rc<dyn Notifier> = self.notifier.clone();
        let confirmer: Rc<dyn Confirmer> = self.confirmer.clone();
        PageContext::new(notifier, confirmer, Rc::new(LogControls))
    }

    /// Renderer drawing into a fresh in-memory surface.
    pub(crate) fn renderer(&self) -> (TerminalSurface, TerminalRenderer) {
        let surface = TerminalSurface::default();
        let renderer = IncrementalRenderer::new(
            surface.clone(),
            TokioYielder,
            self.config.chunk_size,
            self.config.field_limits,
        );
        (surface, renderer)
    }
}
