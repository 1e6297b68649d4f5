//! Management screen: paginated table with row selection and bulk delete.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use lexicon_api_models::{Pagination, PromptId, PromptPage, PromptQuery, SortOrder};

use super::{PageContext, PageError, PagePhase, PageState, count_phrase, finish, reject};
use crate::config::{FieldLimits, UiConfig};
use crate::gateway::{Gateway, Transport};
use crate::models::Entry;
use crate::notify::NotificationKind;
use crate::render::{IncrementalRenderer, RenderError, RenderReport, RowSurface, Yielder};
use crate::selection::{HeaderState, SelectionModel};
use crate::validate::validate_entry;

/// Current page window of the management table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page on screen.
    pub page: u32,
    /// Rows per page.
    pub page_size: u32,
    /// Pages available for the current filter.
    pub total_pages: u32,
    /// Rows matching the current filter.
    pub total: u64,
}

impl PageWindow {
    const fn first(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            total_pages: 0,
            total: 0,
        }
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    const fn with_pagination(self, pagination: &Pagination) -> Self {
        Self {
            page: pagination.page,
            page_size: self.page_size,
            total_pages: pagination.pages,
            total: pagination.total,
        }
    }
}

/// Controller for the management table.
pub struct ManagePage<T, S, Y> {
    ctx: PageContext,
    gateway: Rc<Gateway<T>>,
    renderer: IncrementalRenderer<S, Y>,
    state: PageState,
    selection: RefCell<SelectionModel<PromptId, Entry>>,
    categories: RefCell<Vec<String>>,
    category: RefCell<Option<String>>,
    window: Cell<PageWindow>,
    limits: FieldLimits,
}

impl<T, S, Y> ManagePage<T, S, Y>
where
    T: Transport,
    S: RowSurface,
    Y: Yielder,
{
    /// Controller drawing table rows through `renderer`.
    #[must_use]
    pub fn new(
        ctx: PageContext,
        gateway: Rc<Gateway<T>>,
        renderer: IncrementalRenderer<S, Y>,
        config: &UiConfig,
    ) -> Self {
        let state = PageState::new(Rc::clone(&ctx.controls));
        Self {
            ctx,
            gateway,
            renderer,
            state,
            selection: RefCell::new(SelectionModel::new()),
            categories: RefCell::new(Vec::new()),
            category: RefCell::new(None),
            window: Cell::new(PageWindow::first(config.page_size)),
            limits: config.field_limits,
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

    /// Page window on screen.
    #[must_use]
    pub fn window(&self) -> PageWindow {
        self.window.get()
    }

    /// Active category filter.
    #[must_use]
    pub fn category(&self) -> Option<String> {
        self.category.borrow().clone()
    }

    /// Category names as last loaded.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.categories.borrow().clone()
    }

    /// Load the category filter options.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`] or [`PageError::Request`].
    pub async fn load_categories(&self) -> Result<Vec<String>, PageError> {
        self.state.begin_exclusive()?;
        let result = self.gateway.categories().await;
        let names = finish(&self.ctx, &self.state, "Failed to load categories", result)?;
        *self.categories.borrow_mut() = names.clone();
        Ok(names)
    }

    /// Change the category filter and show its first page.
    ///
    /// # Errors
    ///
    /// See [`ManagePage::load_page`].
    pub async fn set_category(&self, category: Option<&str>) -> Result<RenderReport, PageError> {
        let category = category
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        *self.category.borrow_mut() = category;
        self.load_page(1).await
    }

    /// Show `page` of the current filter; newer calls supersede older ones.
    ///
    /// # Errors
    ///
    /// [`PageError::Superseded`] when a newer load was issued meanwhile, or
    /// [`PageError::Request`] (the previous rows stay on screen).
    pub async fn load_page(&self, page: u32) -> Result<RenderReport, PageError> {
        let ticket = self.state.begin_superseding();
        let listing = self.fetch_page(ticket, page).await?;
        self.show(ticket, listing).await
    }

    /// Reload the page on screen, stepping back when it no longer exists.
    ///
    /// The backend answers an out-of-range page with no rows and the real
    /// page count; the last existing page is fetched instead.
    ///
    /// # Errors
    ///
    /// See [`ManagePage::load_page`].
    pub async fn reload(&self) -> Result<RenderReport, PageError> {
        let ticket = self.state.begin_superseding();
        let requested = self.window.get().page;
        let mut listing = self.fetch_page(ticket, requested).await?;
        let pages = listing.pagination.pages;
        if listing.prompts.is_empty() && pages >= 1 && requested > pages {
            tracing::debug!(requested, pages, "page emptied; stepping back");
            listing = self.fetch_page(ticket, pages).await?;
        }
        self.show(ticket, listing).await
    }

    async fn fetch_page(&self, ticket: u64, page: u32) -> Result<PromptPage, PageError> {
        let query = PromptQuery {
            category: self.category(),
            page: Some(page.max(1)),
            limit: Some(self.window.get().page_size),
            sort: Some(SortOrder::NameAsc),
            keyword: None,
        };
        let result = self.gateway.list_prompts(&query).await;
        if !self.state.is_latest(ticket) {
            tracing::debug!(page, "discarding stale page");
            return Err(PageError::Superseded);
        }
        match result {
            Ok(listing) => Ok(listing),
            Err(err) => finish(&self.ctx, &self.state, "Failed to load entries", Err(err)),
        }
    }

    async fn show(&self, ticket: u64, listing: PromptPage) -> Result<RenderReport, PageError> {
        self.window
            .set(self.window.get().with_pagination(&listing.pagination));
        let entries: Vec<Entry> = listing.prompts.into_iter().map(Entry::from).collect();
        let selected: Vec<PromptId> = self.selection.borrow().keys().copied().collect();
        let report = self
            .renderer
            .render_marked(entries, |entry| {
                entry.id.is_some_and(|id| selected.contains(&id))
            })
            .await;
        if report.superseded || !self.state.is_latest(ticket) {
            return Err(PageError::Superseded);
        }
        self.state.settle(true);
        Ok(report)
    }

    /// Move to the next page; `None` when already on the last page.
    ///
    /// # Errors
    ///
    /// See [`ManagePage::load_page`].
    pub async fn next_page(&self) -> Result<Option<RenderReport>, PageError> {
        let window = self.window.get();
        if !window.has_next() {
            return Ok(None);
        }
        self.load_page(window.page + 1).await.map(Some)
    }

    /// Move to the previous page; `None` when already on the first page.
    ///
    /// # Errors
    ///
    /// See [`ManagePage::load_page`].
    pub async fn prev_page(&self) -> Result<Option<RenderReport>, PageError> {
        let window = self.window.get();
        if !window.has_prev() {
            return Ok(None);
        }
        self.load_page(window.page - 1).await.map(Some)
    }

    fn row(&self, index: usize) -> Result<(PromptId, Entry), PageError> {
        let entry = self.renderer.entry(index).ok_or(RenderError::OutOfRange {
            index,
            len: self.renderer.len(),
        })?;
        let id = entry.id.ok_or(RenderError::OutOfRange {
            index,
            len: self.renderer.len(),
        })?;
        Ok((id, entry))
    }

    /// Select or deselect one row and return the new header state.
    ///
    /// # Errors
    ///
    /// [`PageError::Row`] when no persisted row is rendered at `index`.
    pub fn toggle_row(&self, index: usize, checked: bool) -> Result<HeaderState, PageError> {
        let (id, entry) = self.row(index)?;
        self.selection.borrow_mut().toggle(id, entry, checked);
        self.renderer.set_checked(index, checked);
        Ok(self.header_state())
    }

    /// Select or deselect every row on screen.
    pub fn toggle_all(&self, checked: bool) -> HeaderState {
        {
            let mut selection = self.selection.borrow_mut();
            for entry in self.renderer.visible_records() {
                if let Some(id) = entry.id {
                    selection.toggle(id, entry, checked);
                }
            }
        }
        let selection = self.selection.borrow();
        self.renderer
            .mark(|entry| entry.id.is_some_and(|id| selection.contains(&id)));
        drop(selection);
        self.header_state()
    }

    /// Select-all checkbox state for the rows on screen.
    #[must_use]
    pub fn header_state(&self) -> HeaderState {
        let visible: Vec<PromptId> = self
            .renderer
            .visible_records()
            .into_iter()
            .filter_map(|entry| entry.id)
            .collect();
        self.selection.borrow().header_state(&visible)
    }

    /// Number of selected rows across pages.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selection.borrow().count()
    }

    /// Whether bulk actions should be enabled.
    #[must_use]
    pub fn bulk_enabled(&self) -> bool {
        self.selected_count() > 0
    }

    /// Delete the row at `index` after confirmation, then reload the page.
    ///
    /// # Errors
    ///
    /// [`PageError::ConfirmationAborted`], [`PageError::Busy`] or
    /// [`PageError::Request`] (rows stay on screen).
    pub async fn delete_one(&self, index: usize) -> Result<(), PageError> {
        let (id, entry) = self.row(index)?;
        self.ctx
            .confirm(&format!("Delete \"{}\"? This cannot be undone.", entry.term))
            .await?;
        self.state.begin_exclusive()?;
        let result = self.gateway.delete_prompt(id).await;
        finish(&self.ctx, &self.state, "Delete failed", result)?;
        self.selection.borrow_mut().remove(&id);
        self.ctx
            .notify(NotificationKind::Success, &format!("Deleted \"{}\"", entry.term));
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Delete every selected row after confirmation, then reload the page.
    ///
    /// Returns the number of rows the backend removed.
    ///
    /// # Errors
    ///
    /// [`PageError::EmptySelection`], [`PageError::ConfirmationAborted`],
    /// [`PageError::Busy`] or [`PageError::Request`]. On request failure the
    /// rendered rows and the selection are left untouched.
    pub async fn delete_selected(&self) -> Result<u64, PageError> {
        let ids: Vec<PromptId> = self.selection.borrow().keys().copied().collect();
        if ids.is_empty() {
            self.ctx
                .notify(NotificationKind::Warning, "Select entries to delete first");
            return Err(PageError::EmptySelection);
        }
        self.ctx
            .confirm(&format!(
                "Delete {}? This cannot be undone.",
                count_phrase(ids.len(), "selected entry", "selected entries")
            ))
            .await?;
        self.state.begin_exclusive()?;
        let result = self.gateway.delete_prompts(&ids).await;
        let deleted = finish(&self.ctx, &self.state, "Batch delete failed", result)?;
        self.selection.borrow_mut().clear();
        let removed = usize::try_from(deleted.deleted_count).unwrap_or(usize::MAX);
        self.ctx.notify(
            NotificationKind::Success,
            &format!("Deleted {}", count_phrase(removed, "entry", "entries")),
        );
        self.refresh_after_mutation().await;
        Ok(deleted.deleted_count)
    }

    /// Fresh copy of the row at `index` for the edit form.
    ///
    /// # Errors
    ///
    /// [`PageError::Row`], [`PageError::Busy`] or [`PageError::Request`].
    pub async fn edit_draft(&self, index: usize) -> Result<Entry, PageError> {
        let (id, _) = self.row(index)?;
        self.state.begin_exclusive()?;
        let result = self.gateway.prompt(id).await;
        finish(&self.ctx, &self.state, "Failed to load entry", result).map(Entry::from)
    }

    /// Validate and store an edited entry, then reload the page.
    ///
    /// # Errors
    ///
    /// [`PageError::Validation`] before any request, [`PageError::Busy`] or
    /// [`PageError::Request`].
    pub async fn save_edit(&self, id: PromptId, draft: &Entry) -> Result<Entry, PageError> {
        let entry = validate_entry(draft, &self.limits).map_err(|err| reject(&self.ctx, err))?;
        self.state.begin_exclusive()?;
        let result = self.gateway.update_prompt(id, &entry.to_prompt_input()).await;
        let saved = Entry::from(finish(&self.ctx, &self.state, "Update failed", result)?);
        {
            let mut selection = self.selection.borrow_mut();
            if selection.contains(&id) {
                selection.select(id, saved.clone());
            }
        }
        self.ctx
            .notify(NotificationKind::Success, &format!("Updated \"{}\"", saved.term));
        self.refresh_after_mutation().await;
        Ok(saved)
    }

    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.reload().await {
            tracing::debug!(error = %err, "reload after mutation did not complete");
        }
    }
}
