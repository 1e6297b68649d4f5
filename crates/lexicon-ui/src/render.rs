//! Incremental renderer for glossary tables and term lists.
//!
//! # Design
//! - The renderer owns the backing rows; a [`RowSurface`] mirrors them on screen.
//! - Large collections are appended in chunks with a [`Yielder`] pause between
//!   chunks so input handling is not starved.
//! - Each `render` bumps a generation counter. An older render that resumes
//!   after a yield and sees a newer generation stops without touching the surface.
//! - Row positions are always contiguous from zero; removal relabels every row
//!   after the removed one.

use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use lexicon_api_models::NestedTerms;
use thiserror::Error;

use crate::config::{DEFAULT_CHUNK_SIZE, FieldLimits};
use crate::models::{Entry, Field};
use crate::notify::{NotificationKind, Notifier};
use crate::validate::{ValidationError, validate_field};

/// Cooperative scheduling point between render chunks.
#[async_trait(?Send)]
pub trait Yielder {
    /// Give the scheduler a chance to run other work.
    async fn yield_now(&self);
}

/// Accessibility labels derived from a row position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLabels {
    fields: [String; 4],
    delete: String,
}

impl RowLabels {
    /// Labels for the row at zero-based `index` (rendered one-based).
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        let row = index + 1;
        Self {
            fields: Field::ALL.map(|field| format!("{} - row {row}", field.label())),
            delete: format!("Delete row {row}"),
        }
    }

    /// Label of the input bound to `field`.
    #[must_use]
    pub fn field(&self, field: Field) -> &str {
        let column = match field {
            Field::Category => 0,
            Field::Term => 1,
            Field::Translation => 2,
            Field::Note => 3,
        };
        &self.fields[column]
    }

    /// Label of the row's delete control.
    #[must_use]
    pub fn delete(&self) -> &str {
        &self.delete
    }
}

/// Everything a surface needs to draw one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// Zero-based position, mirrored into the row's index attribute.
    pub index: usize,
    /// Row content.
    pub entry: Entry,
    /// Position-derived labels.
    pub labels: RowLabels,
    /// Initial checkbox state for selectable lists.
    pub checked: bool,
}

/// On-screen mirror of the renderer's rows.
///
/// Implementations address rows by position and must keep positions in step
/// with the calls they receive: after `remove_row(i)` the row formerly at
/// `i + 1` is at `i` and is then relabelled with `relabel_row(i, ..)`.
pub trait RowSurface {
    /// Drop every row.
    fn clear(&self);
    /// Append rows in order at the end.
    fn append_rows(&self, rows: &[RowView]);
    /// Remove the row at `index`.
    fn remove_row(&self, index: usize);
    /// Rewrite the index attribute and labels of the row at `index`.
    fn relabel_row(&self, index: usize, labels: &RowLabels);
    /// Overwrite the displayed value of one field.
    fn set_field_value(&self, index: usize, field: Field, value: &str);
    /// Focus one field and scroll it into view.
    fn focus_field(&self, index: usize, field: Field);
    /// Update a row checkbox.
    fn set_checked(&self, index: usize, checked: bool);
    /// Show or hide a row.
    fn set_visible(&self, index: usize, visible: bool);
}

/// Counters describing one `render` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderReport {
    /// Rows appended by this call.
    pub rows: usize,
    /// Chunks appended by this call.
    pub chunks: usize,
    /// Times control was yielded.
    pub yields: usize,
    /// Whether a newer render took over before this one finished.
    pub superseded: bool,
}

/// Result of an in-place field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The trimmed value was stored.
    Accepted(String),
    /// The trimmed value equals the stored one.
    Unchanged,
    /// The value was rejected and the field restored.
    Rejected(ValidationError),
    /// No row exists at the given position.
    MissingRow,
}

/// Renderer failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A row position outside the rendered range was addressed.
    #[error("row {index} is out of range ({len} rows rendered)")]
    OutOfRange {
        /// Requested position.
        index: usize,
        /// Rows currently rendered.
        len: usize,
    },
}

#[derive(Debug, Clone)]
struct RowState {
    entry: Entry,
    checked: bool,
    visible: bool,
}

impl RowState {
    const fn new(entry: Entry, checked: bool) -> Self {
        Self {
            entry,
            checked,
            visible: true,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        [
            &self.entry.term,
            &self.entry.translation,
            &self.entry.note,
            &self.entry.category,
        ]
        .iter()
        .any(|value| value.to_lowercase().contains(needle))
    }
}

/// Chunked renderer bound to one surface.
pub struct IncrementalRenderer<S, Y> {
    surface: S,
    yielder: Y,
    chunk_size: usize,
    limits: FieldLimits,
    rows: RefCell<Vec<RowState>>,
    generation: Cell<u64>,
}

impl<S: RowSurface, Y: Yielder> IncrementalRenderer<S, Y> {
    /// Renderer appending `chunk_size` rows per chunk and validating edits against `limits`.
    #[must_use]
    pub fn new(surface: S, yielder: Y, chunk_size: usize, limits: FieldLimits) -> Self {
        Self {
            surface,
            yielder,
            chunk_size: if chunk_size == 0 {
                DEFAULT_CHUNK_SIZE
            } else {
                chunk_size
            },
            limits,
            rows: RefCell::new(Vec::new()),
            generation: Cell::new(0),
        }
    }

    /// Surface the renderer draws on.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Rendered row count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    /// Whether no rows are rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    /// Copy of the backing rows in display order.
    #[must_use]
    pub fn records(&self) -> Vec<Entry> {
        self.rows.borrow().iter().map(|row| row.entry.clone()).collect()
    }

    /// Rows not hidden by the current filter.
    #[must_use]
    pub fn visible_records(&self) -> Vec<Entry> {
        self.rows
            .borrow()
            .iter()
            .filter(|row| row.visible)
            .map(|row| row.entry.clone())
            .collect()
    }

    /// Row at `index`.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<Entry> {
        self.rows.borrow().get(index).map(|row| row.entry.clone())
    }

    /// Clear and rebuild the surface from `records`.
    pub async fn render(&self, records: Vec<Entry>) -> RenderReport {
        self.render_marked(records, |_| false).await
    }

    /// Clear and rebuild the surface, checking rows for which `is_checked` holds.
    pub async fn render_marked<F>(&self, records: Vec<Entry>, is_checked: F) -> RenderReport
    where
        F: Fn(&Entry) -> bool,
    {
        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        self.surface.clear();
        self.rows.borrow_mut().clear();

        let yield_between_chunks = records.len() > self.chunk_size;
        let mut report = RenderReport::default();
        for chunk in records.chunks(self.chunk_size) {
            if self.generation.get() != generation {
                report.superseded = true;
                tracing::debug!(rendered = report.rows, "render superseded");
                return report;
            }
            let start = report.rows;
            let views: Vec<RowView> = chunk
                .iter()
                .enumerate()
                .map(|(offset, entry)| RowView {
                    index: start + offset,
                    entry: entry.clone(),
                    labels: RowLabels::for_index(start + offset),
                    checked: is_checked(entry),
                })
                .collect();
            self.surface.append_rows(&views);
            self.rows.borrow_mut().extend(
                views
                    .into_iter()
                    .map(|view| RowState::new(view.entry, view.checked)),
            );
            report.rows += chunk.len();
            report.chunks += 1;
            if yield_between_chunks && report.rows < records.len() {
                self.yielder.yield_now().await;
                report.yields += 1;
            }
        }
        report.superseded = self.generation.get() != generation;
        report
    }

    /// Append one row without a full re-render and focus its first empty field.
    pub fn insert_one(&self, entry: Entry) -> usize {
        let index = self.len();
        let focus = entry.first_empty_field().unwrap_or(Field::Term);
        self.surface.append_rows(&[RowView {
            index,
            entry: entry.clone(),
            labels: RowLabels::for_index(index),
            checked: false,
        }]);
        self.rows.borrow_mut().push(RowState::new(entry, false));
        self.surface.focus_field(index, focus);
        index
    }

    /// Remove the row at `index` and renumber the rows after it.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::OutOfRange`] when no row exists at `index`.
    pub fn remove_one(&self, index: usize) -> Result<Entry, RenderError> {
        let (removed, len) = {
            let mut rows = self.rows.borrow_mut();
            if index >= rows.len() {
                return Err(RenderError::OutOfRange {
                    index,
                    len: rows.len(),
                });
            }
            let removed = rows.remove(index);
            (removed, rows.len())
        };
        self.surface.remove_row(index);
        for position in index..len {
            self.surface
                .relabel_row(position, &RowLabels::for_index(position));
        }
        Ok(removed.entry)
    }

    /// Apply a user edit to one field.
    ///
    /// Rejected values are reported through `notifier` and the field is
    /// restored to its stored value; the backing row is left untouched.
    pub fn edit_field(
        &self,
        index: usize,
        field: Field,
        raw: &str,
        notifier: &dyn Notifier,
    ) -> EditOutcome {
        let Some(current) = self
            .rows
            .borrow()
            .get(index)
            .map(|row| row.entry.field(field).to_string())
        else {
            return EditOutcome::MissingRow;
        };
        match validate_field(field, raw, &self.limits) {
            Ok(value) => {
                if value != raw {
                    self.surface.set_field_value(index, field, &value);
                }
                if value == current {
                    return EditOutcome::Unchanged;
                }
                if let Some(row) = self.rows.borrow_mut().get_mut(index) {
                    row.entry.set_field(field, value.clone());
                }
                EditOutcome::Accepted(value)
            }
            Err(err) => {
                tracing::warn!(index, field = field.key(), error = %err, "edit rejected");
                notifier.notify(NotificationKind::Error, &err.to_string());
                self.surface.set_field_value(index, field, &current);
                EditOutcome::Rejected(err)
            }
        }
    }

    /// Update one row checkbox; returns whether the row exists.
    pub fn set_checked(&self, index: usize, checked: bool) -> bool {
        let found = match self.rows.borrow_mut().get_mut(index) {
            Some(row) => {
                row.checked = checked;
                true
            }
            None => false,
        };
        if found {
            self.surface.set_checked(index, checked);
        }
        found
    }

    /// Set every row checkbox to `checked`.
    pub fn set_all_checked(&self, checked: bool) {
        self.mark(|_| checked);
    }

    /// Re-sync every row checkbox from `is_checked`, touching only rows that change.
    pub fn mark(&self, is_checked: impl Fn(&Entry) -> bool) {
        let changed: Vec<(usize, bool)> = self
            .rows
            .borrow_mut()
            .iter_mut()
            .enumerate()
            .filter_map(|(index, row)| {
                let checked = is_checked(&row.entry);
                (row.checked != checked).then(|| {
                    row.checked = checked;
                    (index, checked)
                })
            })
            .collect();
        for (index, checked) in changed {
            self.surface.set_checked(index, checked);
        }
    }

    /// Hide rows not matching `query` (case-insensitive); returns the visible count.
    pub fn filter(&self, query: &str) -> usize {
        let needle = query.trim().to_lowercase();
        let mut visible_count = 0;
        let mut changed = Vec::new();
        for (index, row) in self.rows.borrow_mut().iter_mut().enumerate() {
            let visible = needle.is_empty() || row.matches(&needle);
            if row.visible != visible {
                row.visible = visible;
                changed.push((index, visible));
            }
            visible_count += usize::from(visible);
        }
        for (index, visible) in changed {
            self.surface.set_visible(index, visible);
        }
        visible_count
    }

    /// Persistable rows grouped by trimmed category for the nested write.
    #[must_use]
    pub fn nest_by_category(&self) -> NestedTerms {
        let mut nested = NestedTerms::new();
        for row in self.rows.borrow().iter() {
            if row.entry.is_persistable() {
                nested
                    .entry(row.entry.category.trim().to_string())
                    .or_default()
                    .push(row.entry.to_term_record());
            }
        }
        nested
    }
}
