//! Per-screen controllers.
//!
//! # Design
//! - Every controller follows `idle -> loading -> (succeeded | failed)`; the
//!   resting states accept new actions just like `idle`.
//! - Entering `loading` disables the screen's controls and settling re-enables
//!   them, whatever the outcome.
//! - Exclusive actions (saves, deletes, restores) are refused with
//!   [`PageError::Busy`] while loading. Navigational loads (category or page
//!   changes) supersede instead: each carries a sequence number and a result
//!   whose number is no longer the latest is discarded.
//! - Failures are reported through the notifier before the error is returned,
//!   and already-rendered data is left untouched.
//! - Changes that reach beyond one screen (restores) are announced through
//!   [`DataRefresh`] so other mounted screens re-fetch.

mod backup;
mod combine;
mod editor;
mod input;
mod manage;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use thiserror::Error;

use crate::gateway::RequestError;
use crate::notify::{NotificationKind, Notifier};
use crate::render::RenderError;
use crate::validate::ValidationError;

pub use backup::BackupPage;
pub use combine::{Clipboard, CombinePage};
pub use editor::EditorPage;
pub use input::{EntryForm, InputPage};
pub use manage::{ManagePage, PageWindow};

/// Modal yes/no prompt shown before destructive actions.
#[async_trait(?Send)]
pub trait Confirmer {
    /// Ask `message`; `true` means proceed.
    async fn confirm(&self, message: &str) -> bool;
}

/// Enables and disables a screen's action controls.
pub trait Controls {
    /// Reflect the loading state on the screen.
    fn set_loading(&self, loading: bool);
}

/// Collaborators shared by every controller on a screen.
#[derive(Clone)]
pub struct PageContext {
    /// Notification channel.
    pub notifier: Rc<dyn Notifier>,
    /// Destructive-action confirmation.
    pub confirmer: Rc<dyn Confirmer>,
    /// Loading indicator and control toggling.
    pub controls: Rc<dyn Controls>,
}

impl PageContext {
    /// Bundle the three collaborators.
    #[must_use]
    pub fn new(
        notifier: Rc<dyn Notifier>,
        confirmer: Rc<dyn Confirmer>,
        controls: Rc<dyn Controls>,
    ) -> Self {
        Self {
            notifier,
            confirmer,
            controls,
        }
    }

    pub(crate) fn notify(&self, kind: NotificationKind, message: &str) {
        self.notifier.notify(kind, message);
    }

    pub(crate) async fn confirm(&self, message: &str) -> Result<(), PageError> {
        if self.confirmer.confirm(message).await {
            Ok(())
        } else {
            tracing::debug!(message, "confirmation declined");
            Err(PageError::ConfirmationAborted)
        }
    }
}

/// Re-fetch hooks run after a change that invalidates data on other screens.
#[derive(Default)]
pub struct DataRefresh {
    listeners: RefCell<Vec<Rc<dyn Fn()>>>,
}

impl DataRefresh {
    /// Hub without listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `listener` on every future [`DataRefresh::emit`].
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Call every listener in subscription order; returns how many ran.
    pub fn emit(&self) -> usize {
        let listeners = self.listeners.borrow().clone();
        for listener in &listeners {
            listener();
        }
        listeners.len()
    }
}

/// Controller lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePhase {
    /// Nothing has run yet.
    Idle,
    /// An operation is in flight; controls are disabled.
    Loading,
    /// The last operation completed.
    Succeeded,
    /// The last operation failed.
    Failed,
}

/// Controller-level failure, returned after the user has been notified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// Input was rejected locally; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The gateway reported a failure.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// The user declined a confirmation.
    #[error("action cancelled")]
    ConfirmationAborted,
    /// Another exclusive operation is still running.
    #[error("another operation is still in progress")]
    Busy,
    /// A newer load replaced this one; its result was discarded.
    #[error("superseded by a newer request")]
    Superseded,
    /// The addressed row does not exist.
    #[error(transparent)]
    Row(#[from] RenderError),
    /// The action needs a selection and none exists.
    #[error("nothing is selected")]
    EmptySelection,
    /// The table holds no rows worth sorting.
    #[error("nothing to sort")]
    NothingToSort,
    /// The system clipboard refused the text.
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

/// Phase tracking, control toggling and request sequencing for one controller.
pub(crate) struct PageState {
    phase: Cell<PagePhase>,
    sequence: Cell<u64>,
    controls: Rc<dyn Controls>,
}

impl PageState {
    pub(crate) fn new(controls: Rc<dyn Controls>) -> Self {
        Self {
            phase: Cell::new(PagePhase::Idle),
            sequence: Cell::new(0),
            controls,
        }
    }

    pub(crate) fn phase(&self) -> PagePhase {
        self.phase.get()
    }

    /// Enter `loading` for an exclusive action.
    pub(crate) fn begin_exclusive(&self) -> Result<(), PageError> {
        if self.phase.get() == PagePhase::Loading {
            return Err(PageError::Busy);
        }
        self.enter_loading();
        Ok(())
    }

    /// Enter `loading` for a navigational load and return its ticket.
    pub(crate) fn begin_superseding(&self) -> u64 {
        let ticket = self.sequence.get() + 1;
        self.sequence.set(ticket);
        self.enter_loading();
        ticket
    }

    pub(crate) fn is_latest(&self, ticket: u64) -> bool {
        self.sequence.get() == ticket
    }

    pub(crate) fn settle(&self, succeeded: bool) {
        self.phase.set(if succeeded {
            PagePhase::Succeeded
        } else {
            PagePhase::Failed
        });
        self.controls.set_loading(false);
    }

    fn enter_loading(&self) {
        self.phase.set(PagePhase::Loading);
        self.controls.set_loading(true);
    }
}

/// Settle `state` from `result`, notifying on failure with `context` as prefix.
pub(crate) fn finish<T>(
    ctx: &PageContext,
    state: &PageState,
    context: &str,
    result: Result<T, RequestError>,
) -> Result<T, PageError> {
    match result {
        Ok(value) => {
            state.settle(true);
            Ok(value)
        }
        Err(err) => {
            state.settle(false);
            ctx.notify(NotificationKind::Error, &format!("{context}: {err}"));
            Err(PageError::Request(err))
        }
    }
}

/// Report a local validation failure next to the input it concerns.
pub(crate) fn reject(ctx: &PageContext, err: ValidationError) -> PageError {
    ctx.notify(NotificationKind::Warning, &err.to_string());
    PageError::Validation(err)
}

/// Plural-aware count phrase such as `1 entry` / `3 entries`.
pub(crate) fn count_phrase(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
