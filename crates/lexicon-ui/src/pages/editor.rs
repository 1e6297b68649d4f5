//! Flattened table editor for one category at a time.

use std::cell::RefCell;
use std::rc::Rc;

use super::{PageContext, PageError, PagePhase, PageState, count_phrase, finish, reject};
use crate::gateway::{Gateway, RequestError, Transport};
use crate::models::{Entry, Field};
use crate::notify::NotificationKind;
use crate::render::{EditOutcome, IncrementalRenderer, RenderReport, RowSurface, Yielder};
use crate::validate::ValidationError;

/// Controller for the table editor.
pub struct EditorPage<T, S, Y> {
    ctx: PageContext,
    gateway: Rc<Gateway<T>>,
    renderer: IncrementalRenderer<S, Y>,
    state: PageState,
    categories: RefCell<Vec<String>>,
    active: RefCell<Option<String>>,
}

impl<T, S, Y> EditorPage<T, S, Y>
where
    T: Transport,
    S: RowSurface,
    Y: Yielder,
{
    /// Controller editing rows through `renderer`.
    #[must_use]
    pub fn new(ctx: PageContext, gateway: Rc<Gateway<T>>, renderer: IncrementalRenderer<S, Y>) -> Self {
        let state = PageState::new(Rc::clone(&ctx.controls));
        Self {
            ctx,
            gateway,
            renderer,
            state,
            categories: RefCell::new(Vec::new()),
            active: RefCell::new(None),
        }
    }

    /// Renderer backing the table.
    pub const fn renderer(&self) -> &IncrementalRenderer<S, Y> {
        &self.renderer
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> PagePhase {
        self.state.phase()
    }

    /// Category loaded into the table.
    #[must_use]
    pub fn active_category(&self) -> Option<String> {
        self.active.borrow().clone()
    }

    /// Category names as last loaded.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.categories.borrow().clone()
    }

    /// Load the category dropdown.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`] or [`PageError::Request`].
    pub async fn load_categories(&self) -> Result<Vec<String>, PageError> {
        self.state.begin_exclusive()?;
        let result = self.gateway.legacy_categories().await;
        let names = finish(&self.ctx, &self.state, "Failed to load categories", result)?;
        *self.categories.borrow_mut() = names.clone();
        Ok(names)
    }

    /// Show the rows of `category`.
    ///
    /// A blank name clears the table. A category without rows gets one blank
    /// row carrying its name so there is something to type into.
    ///
    /// # Errors
    ///
    /// [`PageError::Superseded`] when another category was chosen meanwhile,
    /// or [`PageError::Request`] (the previous rows stay on screen).
    pub async fn load_category(&self, category: &str) -> Result<RenderReport, PageError> {
        let category = category.trim().to_string();
        let ticket = self.state.begin_superseding();
        if category.is_empty() {
            *self.active.borrow_mut() = None;
            let report = self.renderer.render(Vec::new()).await;
            self.state.settle(true);
            self.ctx
                .notify(NotificationKind::Info, "Choose a category to edit");
            return Ok(report);
        }
        let result = self.gateway.list_by_category(&category).await;
        if !self.state.is_latest(ticket) {
            return Err(PageError::Superseded);
        }
        let entries = match result {
            Ok(entries) => entries,
            Err(err) => return finish(&self.ctx, &self.state, "Failed to load category", Err(err)),
        };
        let empty = entries.is_empty();
        *self.active.borrow_mut() = Some(category.clone());
        let report = self.renderer.render(entries).await;
        if report.superseded || !self.state.is_latest(ticket) {
            return Err(PageError::Superseded);
        }
        if empty {
            self.renderer.insert_one(Entry::blank(category));
        }
        self.state.settle(true);
        Ok(report)
    }

    /// Append a blank row for the active category; returns its position.
    ///
    /// # Errors
    ///
    /// [`PageError::Validation`] when no category is loaded.
    pub fn add_row(&self) -> Result<usize, PageError> {
        let Some(category) = self.active_category() else {
            return Err(reject(
                &self.ctx,
                ValidationError::Required {
                    field: Field::Category,
                },
            ));
        };
        Ok(self.renderer.insert_one(Entry::blank(category)))
    }

    /// Remove the row at `index` after confirmation.
    ///
    /// Removing the last row leaves one blank row for the active category.
    ///
    /// # Errors
    ///
    /// [`PageError::ConfirmationAborted`] or [`PageError::Row`].
    pub async fn delete_row(&self, index: usize) -> Result<Entry, PageError> {
        self.ctx
            .confirm(&format!("Delete row {}?", index + 1))
            .await?;
        let removed = self.renderer.remove_one(index)?;
        if self.renderer.is_empty() {
            let category = self
                .active_category()
                .unwrap_or_else(|| removed.category.clone());
            self.renderer.insert_one(Entry::blank(category));
        }
        self.ctx.notify(NotificationKind::Success, "Row deleted");
        Ok(removed)
    }

    /// Apply a cell edit; rejected values are reported and reverted.
    pub fn edit_cell(&self, index: usize, field: Field, raw: &str) -> EditOutcome {
        self.renderer
            .edit_field(index, field, raw, self.ctx.notifier.as_ref())
    }

    /// Write every complete row back, grouped by category.
    ///
    /// Rows missing a category, term or translation are dropped. Returns the
    /// number of rows written.
    ///
    /// # Errors
    ///
    /// [`PageError::Validation`] without a loaded category,
    /// [`PageError::ConfirmationAborted`], [`PageError::Busy`] or
    /// [`PageError::Request`].
    pub async fn save(&self) -> Result<usize, PageError> {
        let loaded = self.require_active()?;
        self.ctx
            .confirm(&format!("Save changes to \"{loaded}\"? Existing rows will be replaced."))
            .await?;
        self.state.begin_exclusive()?;
        let written = self.write_rows(&loaded).await;
        let written = finish(&self.ctx, &self.state, "Save failed", written)?;
        self.ctx.notify(
            NotificationKind::Success,
            &format!("Saved {}", count_phrase(written, "row", "rows")),
        );
        self.refresh(&loaded).await;
        Ok(written)
    }

    /// Save, then ask the server to sort the active category.
    ///
    /// # Errors
    ///
    /// [`PageError::NothingToSort`] when the table is empty or holds a single
    /// blank row; otherwise as for [`EditorPage::save`].
    pub async fn sort_and_save(&self) -> Result<usize, PageError> {
        let loaded = self.require_active()?;
        let nothing_to_sort = match self.renderer.records().as_slice() {
            [] => true,
            [only] => only.term.trim().is_empty(),
            _ => false,
        };
        if nothing_to_sort {
            self.ctx
                .notify(NotificationKind::Warning, "Nothing to sort");
            return Err(PageError::NothingToSort);
        }
        self.ctx
            .confirm(&format!("Save and sort \"{loaded}\"? Existing rows will be replaced."))
            .await?;
        self.state.begin_exclusive()?;
        let result = async {
            let written = self.write_rows(&loaded).await?;
            self.gateway.sort_category(&loaded).await?;
            Ok::<_, RequestError>(written)
        }
        .await;
        let written = finish(&self.ctx, &self.state, "Sort failed", result)?;
        self.ctx.notify(
            NotificationKind::Success,
            &format!("Saved and sorted \"{loaded}\""),
        );
        self.refresh(&loaded).await;
        Ok(written)
    }

    fn require_active(&self) -> Result<String, PageError> {
        self.active_category().ok_or_else(|| {
            reject(
                &self.ctx,
                ValidationError::Required {
                    field: Field::Category,
                },
            )
        })
    }

    async fn write_rows(&self, loaded: &str) -> Result<usize, RequestError> {
        let nested = self.renderer.nest_by_category();
        let written = nested.values().map(Vec::len).sum();
        self.gateway.save(&nested, loaded).await?;
        Ok(written)
    }

    async fn refresh(&self, category: &str) {
        if let Err(err) = self.load_categories().await {
            tracing::debug!(error = %err, "category refresh after save did not complete");
        }
        if let Err(err) = self.load_category(category).await {
            tracing::debug!(error = %err, "reload after save did not complete");
        }
    }
}
