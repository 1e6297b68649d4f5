//! Entry input form.

use std::cell::RefCell;
use std::rc::Rc;

use super::{PageContext, PageError, PagePhase, PageState, finish, reject};
use crate::config::FieldLimits;
use crate::gateway::{Gateway, Transport};
use crate::models::Entry;
use crate::notify::NotificationKind;
use crate::validate::validate_entry;

/// Raw values of the input form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    /// Category picked from the dropdown.
    pub category: String,
    /// Typed category name when the "new category" toggle is on.
    pub new_category: Option<String>,
    /// Source term.
    pub term: String,
    /// Translation.
    pub translation: String,
    /// Optional note.
    pub note: String,
}

impl EntryForm {
    /// Entry the form describes; a typed new category wins over the dropdown.
    #[must_use]
    pub fn to_entry(&self) -> Entry {
        let category = self
            .new_category
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.category);
        Entry::new(category, &self.term, &self.translation, &self.note)
    }
}

/// Controller for the input form.
pub struct InputPage<T> {
    ctx: PageContext,
    gateway: Rc<Gateway<T>>,
    state: PageState,
    limits: FieldLimits,
    categories: RefCell<Vec<String>>,
}

impl<T: Transport> InputPage<T> {
    /// Controller submitting through `gateway`.
    #[must_use]
    pub fn new(ctx: PageContext, gateway: Rc<Gateway<T>>, limits: FieldLimits) -> Self {
        let state = PageState::new(Rc::clone(&ctx.controls));
        Self {
            ctx,
            gateway,
            state,
            limits,
            categories: RefCell::new(Vec::new()),
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> PagePhase {
        self.state.phase()
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
        let result = self.gateway.categories().await;
        let names = finish(&self.ctx, &self.state, "Failed to load categories", result)?;
        *self.categories.borrow_mut() = names.clone();
        Ok(names)
    }

    /// Validate and create the entry, then refresh the dropdown.
    ///
    /// # Errors
    ///
    /// [`PageError::Validation`] before any request, [`PageError::Busy`] or
    /// [`PageError::Request`].
    pub async fn submit(&self, form: &EntryForm) -> Result<Entry, PageError> {
        let entry =
            validate_entry(&form.to_entry(), &self.limits).map_err(|err| reject(&self.ctx, err))?;
        self.state.begin_exclusive()?;
        let result = self.gateway.create_prompt(&entry.to_prompt_input()).await;
        let created = Entry::from(finish(&self.ctx, &self.state, "Failed to add entry", result)?);
        self.ctx.notify(
            NotificationKind::Success,
            &format!("Added \"{}\" to {}", created.term, created.category),
        );
        self.refresh_categories().await;
        Ok(created)
    }

    /// Validate and submit through the legacy form endpoint.
    ///
    /// # Errors
    ///
    /// As for [`InputPage::submit`].
    pub async fn submit_legacy(&self, form: &EntryForm) -> Result<Entry, PageError> {
        let entry =
            validate_entry(&form.to_entry(), &self.limits).map_err(|err| reject(&self.ctx, err))?;
        self.state.begin_exclusive()?;
        let result = self.gateway.add_entry(&entry).await;
        finish(&self.ctx, &self.state, "Failed to add entry", result)?;
        self.ctx.notify(
            NotificationKind::Success,
            &format!("Added \"{}\" to {}", entry.term, entry.category),
        );
        self.refresh_categories().await;
        Ok(entry)
    }

    async fn refresh_categories(&self) {
        if let Err(err) = self.load_categories().await {
            tracing::debug!(error = %err, "category refresh after submit did not complete");
        }
    }
}
