//! Terminal adapters for the page controllers.
//!
//! # Design
//! - `TerminalSurface` mirrors rendered rows in memory; output renderers read
//!   the mirror once a command has settled.
//! - Notifications go to stderr so stdout stays machine-readable.
//! - Confirmation is skipped with `--yes` and declined when stdin is not a
//!   terminal.

use std::cell::{Cell, RefCell};
use std::io::{self, BufRead, IsTerminal, Write};
use std::rc::Rc;

use async_trait::async_trait;
use lexicon_ui::models::{Entry, Field};
use lexicon_ui::notify::{NotificationKind, Notifier};
use lexicon_ui::pages::{Clipboard, Confirmer, Controls};
use lexicon_ui::render::{RowLabels, RowSurface, RowView, Yielder};

/// One row as last drawn by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TerminalRow {
    pub(crate) entry: Entry,
    pub(crate) checked: bool,
    pub(crate) visible: bool,
}

/// In-memory row mirror.
#[derive(Clone, Default)]
pub(crate) struct TerminalSurface {
    rows: Rc<RefCell<Vec<TerminalRow>>>,
}

impl TerminalSurface {
    /// Visible rows in display order.
    pub(crate) fn visible(&self) -> Vec<TerminalRow> {
        self.rows
            .borrow()
            .iter()
            .filter(|row| row.visible)
            .cloned()
            .collect()
    }
}

impl RowSurface for TerminalSurface {
    fn clear(&self) {
        self.rows.borrow_mut().clear();
    }

    fn append_rows(&self, rows: &[RowView]) {
        self.rows
            .borrow_mut()
            .extend(rows.iter().map(|view| TerminalRow {
                entry: view.entry.clone(),
                checked: view.checked,
                visible: true,
            }));
    }

    fn remove_row(&self, index: usize) {
        let mut rows = self.rows.borrow_mut();
        if index < rows.len() {
            rows.remove(index);
        }
    }

    fn relabel_row(&self, _index: usize, _labels: &RowLabels) {}

    fn set_field_value(&self, index: usize, field: Field, value: &str) {
        if let Some(row) = self.rows.borrow_mut().get_mut(index) {
            row.entry.set_field(field, value.to_string());
        }
    }

    fn focus_field(&self, _index: usize, _field: Field) {}

    fn set_checked(&self, index: usize, checked: bool) {
        if let Some(row) = self.rows.borrow_mut().get_mut(index) {
            row.checked = checked;
        }
    }

    fn set_visible(&self, index: usize, visible: bool) {
        if let Some(row) = self.rows.borrow_mut().get_mut(index) {
            row.visible = visible;
        }
    }
}

/// Cooperative yield on the current-thread runtime.
pub(crate) struct TokioYielder;

#[async_trait(?Send)]
impl Yielder for TokioYielder {
    async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }
}

/// Prints notifications to stderr and mirrors them into the log.
#[derive(Default)]
pub(crate) struct TerminalNotifier {
    next_id: Cell<u64>,
    quiet: bool,
}

impl TerminalNotifier {
    pub(crate) fn new(quiet: bool) -> Self {
        Self {
            next_id: Cell::new(0),
            quiet,
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        match kind {
            NotificationKind::Error => tracing::warn!(kind = kind.as_str(), message),
            _ => tracing::debug!(kind = kind.as_str(), message),
        }
        if !self.quiet || kind == NotificationKind::Error {
            eprintln!("[{}] {message}", kind.as_str());
        }
        id
    }
}

/// Asks on stderr and reads one line from stdin.
pub(crate) struct StdinConfirmer {
    assume_yes: bool,
}

impl StdinConfirmer {
    pub(crate) const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait(?Send)]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            eprintln!("{message} (pass --yes to confirm non-interactively)");
            return false;
        }
        eprint!("{message} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_affirmative(&answer)
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Logs loading transitions; the terminal has no controls to disable.
pub(crate) struct LogControls;

impl Controls for LogControls {
    fn set_loading(&self, loading: bool) {
        tracing::trace!(loading, "controller loading state");
    }
}

/// Writes the combined text to stdout so it can be piped.
#[derive(Default)]
pub(crate) struct StdoutClipboard {
    written: RefCell<Option<String>>,
}

impl StdoutClipboard {
    pub(crate) fn written(&self) -> Option<String> {
        self.written.borrow().clone()
    }
}

#[async_trait(?Send)]
impl Clipboard for StdoutClipboard {
    async fn write_text(&self, text: &str) -> Result<(), String> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}").map_err(|err| err.to_string())?;
        *self.written.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(index: usize, term: &str) -> RowView {
        RowView {
            index,
            entry: Entry::new("Animals", term, format!("{term}-fr"), ""),
            labels: RowLabels::for_index(index),
            checked: false,
        }
    }

    #[test]
    fn surface_tracks_removals_and_visibility() {
        let surface = TerminalSurface::default();
        surface.append_rows(&[view(0, "cat"), view(1, "dog"), view(2, "owl")]);
        surface.remove_row(1);
        surface.set_visible(0, false);
        surface.set_checked(1, true);

        let visible = surface.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].entry.term, "owl");
        assert!(visible[0].checked);
    }

    #[test]
    fn surface_applies_field_reverts() {
        let surface = TerminalSurface::default();
        surface.append_rows(&[view(0, "cat")]);
        surface.set_field_value(0, Field::Note, "restored");
        assert_eq!(surface.visible()[0].entry.note, "restored");
    }

    #[test]
    fn only_yes_answers_confirm() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("nope"));
    }

    #[tokio::test]
    async fn assume_yes_skips_the_prompt() {
        assert!(StdinConfirmer::new(true).confirm("Delete?").await);
    }

    #[test]
    fn notifier_ids_increase() {
        let notifier = TerminalNotifier::new(true);
        let first = notifier.notify(NotificationKind::Info, "one");
        let second = notifier.notify(NotificationKind::Info, "two");
        assert!(second > first);
    }
}
