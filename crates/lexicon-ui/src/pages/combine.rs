//! Combine screen: pick terms across categories and join their translations.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use async_trait::async_trait;
use lexicon_api_models::PromptQuery;

use super::{PageContext, PageError, PagePhase, PageState, count_phrase, finish};
use crate::config::{CombineSource, UiConfig};
use crate::gateway::{Gateway, RequestError, Transport};
use crate::models::{Entry, SelectionKey};
use crate::notify::NotificationKind;
use crate::render::{IncrementalRenderer, RenderError, RenderReport, RowSurface, Yielder};
use crate::selection::SelectionModel;

/// System clipboard.
#[async_trait(?Send)]
pub trait Clipboard {
    /// Replace the clipboard content with `text`.
    async fn write_text(&self, text: &str) -> Result<(), String>;
}

/// Controller for the combine screen.
pub struct CombinePage<T, S, Y> {
    ctx: PageContext,
    gateway: Rc<Gateway<T>>,
    renderer: IncrementalRenderer<S, Y>,
    state: PageState,
    selection: RefCell<SelectionModel<SelectionKey, Entry>>,
    categories: RefCell<Vec<String>>,
    active_category: RefCell<Option<String>>,
    use_prefix: Cell<bool>,
    prefix: String,
    joiner: String,
    limit: u32,
    source: CombineSource,
}

impl<T, S, Y> CombinePage<T, S, Y>
where
    T: Transport,
    S: RowSurface,
    Y: Yielder,
{
    /// Controller drawing term checkboxes through `renderer`.
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
            active_category: RefCell::new(None),
            use_prefix: Cell::new(false),
            prefix: config.prompt_prefix.clone(),
            joiner: config.joiner.clone(),
            limit: config.combine_limit,
            source: config.combine_source,
        }
    }

    /// Renderer backing the term list.
    pub const fn renderer(&self) -> &IncrementalRenderer<S, Y> {
        &self.renderer
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> PagePhase {
        self.state.phase()
    }

    /// Category names as last loaded, in server order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.categories.borrow().clone()
    }

    /// Category whose terms are on screen.
    #[must_use]
    pub fn active_category(&self) -> Option<String> {
        self.active_category.borrow().clone()
    }

    /// Load the category list.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`] while another action runs, or [`PageError::Request`].
    pub async fn load_categories(&self) -> Result<Vec<String>, PageError> {
        self.state.begin_exclusive()?;
        let result = match self.source {
            CombineSource::V1 => self.gateway.categories().await,
            CombineSource::Legacy => self.gateway.legacy_categories().await,
        };
        let names = finish(&self.ctx, &self.state, "Failed to load categories", result)?;
        *self.categories.borrow_mut() = names.clone();
        Ok(names)
    }

    /// Show the terms of `category`, checking those already selected.
    ///
    /// # Errors
    ///
    /// [`PageError::Superseded`] when a newer category was chosen meanwhile,
    /// or [`PageError::Request`].
    pub async fn select_category(&self, category: &str) -> Result<RenderReport, PageError> {
        let category = category.trim().to_string();
        let ticket = self.state.begin_superseding();
        let result = self.fetch_terms(&category).await;
        if !self.state.is_latest(ticket) {
            return Err(PageError::Superseded);
        }
        let entries = match result {
            Ok(entries) => entries,
            Err(err) => return finish(&self.ctx, &self.state, "Failed to load terms", Err(err)),
        };
        *self.active_category.borrow_mut() = Some(category);
        let selected: HashSet<SelectionKey> = self.selection.borrow().keys().cloned().collect();
        let report = self
            .renderer
            .render_marked(entries, |entry| selected.contains(&entry.selection_key()))
            .await;
        if report.superseded || !self.state.is_latest(ticket) {
            return Err(PageError::Superseded);
        }
        self.state.settle(true);
        Ok(report)
    }

    async fn fetch_terms(&self, category: &str) -> Result<Vec<Entry>, RequestError> {
        match self.source {
            CombineSource::V1 => {
                let query = PromptQuery {
                    category: Some(category.to_string()),
                    limit: Some(self.limit),
                    ..PromptQuery::default()
                };
                let page = self.gateway.list_prompts(&query).await?;
                Ok(page.prompts.into_iter().map(Entry::from).collect())
            }
            CombineSource::Legacy => Ok(self
                .gateway
                .terms(category)
                .await?
                .into_iter()
                .map(|record| Entry::from_term(category, record))
                .collect()),
        }
    }

    /// Select or deselect the term at `index`; returns whether the selection changed.
    ///
    /// # Errors
    ///
    /// [`PageError::Row`] when no term is rendered at `index`.
    pub fn toggle(&self, index: usize, checked: bool) -> Result<bool, PageError> {
        let entry = self.renderer.entry(index).ok_or(RenderError::OutOfRange {
            index,
            len: self.renderer.len(),
        })?;
        let changed =
            self.selection
                .borrow_mut()
                .toggle(entry.selection_key(), entry.clone(), checked);
        self.renderer.set_checked(index, checked);
        if changed {
            let verb = if checked { "Added" } else { "Removed" };
            self.ctx
                .notify(NotificationKind::Success, &format!("{verb}: {}", entry.translation));
        }
        Ok(changed)
    }

    /// Number of selected terms.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selection.borrow().count()
    }

    /// Drop the whole selection after confirmation.
    ///
    /// # Errors
    ///
    /// [`PageError::ConfirmationAborted`] when the user declines.
    pub async fn clear_selection(&self) -> Result<(), PageError> {
        let count = self.selected_count();
        if count == 0 {
            self.ctx
                .notify(NotificationKind::Info, "Nothing is selected");
            return Ok(());
        }
        self.ctx
            .confirm(&format!(
                "Clear all {} from the selection?",
                count_phrase(count, "selected term", "selected terms")
            ))
            .await?;
        self.selection.borrow_mut().clear();
        self.renderer.set_all_checked(false);
        self.ctx
            .notify(NotificationKind::Success, "Selection cleared");
        Ok(())
    }

    /// Toggle the prompt prefix.
    pub fn set_prefix_enabled(&self, enabled: bool) {
        self.use_prefix.set(enabled);
    }

    /// Whether the prompt prefix is applied.
    #[must_use]
    pub fn prefix_enabled(&self) -> bool {
        self.use_prefix.get()
    }

    /// Combined text for the current selection.
    #[must_use]
    pub fn preview(&self) -> String {
        let prefix = self.use_prefix.get().then_some(self.prefix.as_str());
        self.selection.borrow().serialize(&self.joiner, prefix)
    }

    /// Copy the combined text to `clipboard`.
    ///
    /// # Errors
    ///
    /// [`PageError::EmptySelection`] when nothing is selected, or
    /// [`PageError::Clipboard`] when the clipboard refuses the text.
    pub async fn copy_text(&self, clipboard: &dyn Clipboard) -> Result<String, PageError> {
        let text = self.preview();
        if text.is_empty() {
            self.ctx
                .notify(NotificationKind::Warning, "Select at least one term to copy");
            return Err(PageError::EmptySelection);
        }
        match clipboard.write_text(&text).await {
            Ok(()) => {
                let count = self.selected_count();
                self.ctx.notify(
                    NotificationKind::Success,
                    &format!("Copied {} to the clipboard", count_phrase(count, "term", "terms")),
                );
                Ok(text)
            }
            Err(reason) => {
                self.ctx
                    .notify(NotificationKind::Error, &format!("Copy failed: {reason}"));
                Err(PageError::Clipboard(reason))
            }
        }
    }

    /// Filter rendered terms; returns how many remain visible.
    pub fn search(&self, query: &str) -> usize {
        let visible = self.renderer.filter(query);
        let query = query.trim();
        if !query.is_empty() {
            self.ctx.notify(
                NotificationKind::Info,
                &format!(
                    "{} matching \"{query}\"",
                    count_phrase(visible, "term", "terms")
                ),
            );
        }
        visible
    }
}
