//! Backup screen: export links, restore uploads and history.

use std::rc::Rc;

use lexicon_api_models::{
    BackupFormat, BackupHistoryEntry, CategoryStats, RestoreMode, RestoreSummary,
};

use super::{DataRefresh, PageContext, PageError, PagePhase, PageState, finish, reject};
use crate::gateway::{Gateway, Transport};
use crate::notify::NotificationKind;
use crate::validate::validate_file_name;

const CSV_EXTENSIONS: &[&str] = &["csv"];
const DB_EXTENSIONS: &[&str] = &["db", "sqlite", "sqlite3"];

/// Controller for the backup screen.
pub struct BackupPage<T> {
    ctx: PageContext,
    gateway: Rc<Gateway<T>>,
    state: PageState,
    refresh: Option<Rc<DataRefresh>>,
}

impl<T: Transport> BackupPage<T> {
    /// Controller talking to `gateway`.
    #[must_use]
    pub fn new(ctx: PageContext, gateway: Rc<Gateway<T>>) -> Self {
        let state = PageState::new(Rc::clone(&ctx.controls));
        Self {
            ctx,
            gateway,
            state,
            refresh: None,
        }
    }

    /// Announce successful restores on `refresh`.
    #[must_use]
    pub fn with_refresh(mut self, refresh: Rc<DataRefresh>) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> PagePhase {
        self.state.phase()
    }

    /// Download link for an export; `category` only narrows CSV exports.
    #[must_use]
    pub fn export_url(&self, format: BackupFormat, category: Option<&str>) -> String {
        self.gateway.export_url(format, category)
    }

    /// Fetch an export as bytes.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`] or [`PageError::Request`].
    pub async fn download(
        &self,
        format: BackupFormat,
        category: Option<&str>,
    ) -> Result<Vec<u8>, PageError> {
        self.state.begin_exclusive()?;
        let result = self.gateway.download(format, category).await;
        finish(&self.ctx, &self.state, "Export failed", result)
    }

    /// Upload a backup file; replace mode asks for confirmation first.
    ///
    /// A completed restore fires the attached [`DataRefresh`] hooks.
    ///
    /// # Errors
    ///
    /// [`PageError::Validation`] for a file of the wrong type,
    /// [`PageError::ConfirmationAborted`], [`PageError::Busy`] or
    /// [`PageError::Request`].
    pub async fn restore(
        &self,
        format: BackupFormat,
        mode: RestoreMode,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<RestoreSummary, PageError> {
        let (extensions, expected) = match format {
            BackupFormat::Csv => (CSV_EXTENSIONS, ".csv"),
            BackupFormat::Db => (DB_EXTENSIONS, ".db, .sqlite or .sqlite3"),
        };
        validate_file_name(filename, extensions, expected).map_err(|err| reject(&self.ctx, err))?;
        if mode.is_destructive() {
            self.ctx
                .confirm("Replace mode deletes every existing entry before restoring. Continue?")
                .await?;
        }
        self.state.begin_exclusive()?;
        let result = match format {
            BackupFormat::Csv => self.gateway.restore_csv(mode, filename, bytes).await,
            BackupFormat::Db => self.gateway.restore_db(mode, filename, bytes).await,
        };
        let summary = finish(&self.ctx, &self.state, "Restore failed", result)?;
        tracing::info!(
            format = format.as_str(),
            mode = mode.as_str(),
            filename,
            "restore completed"
        );
        let kind = if summary.errors.is_empty() {
            NotificationKind::Success
        } else {
            NotificationKind::Warning
        };
        self.ctx.notify(kind, &describe(&summary));
        if let Some(refresh) = &self.refresh {
            let listeners = refresh.emit();
            tracing::debug!(listeners, "refresh requested after restore");
        }
        Ok(summary)
    }

    /// Past restore operations.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`] or [`PageError::Request`].
    pub async fn history(&self) -> Result<Vec<BackupHistoryEntry>, PageError> {
        self.state.begin_exclusive()?;
        let result = self.gateway.backup_history().await;
        finish(&self.ctx, &self.state, "Failed to load history", result)
    }

    /// Category and entry totals shown next to the export buttons.
    ///
    /// # Errors
    ///
    /// [`PageError::Busy`] or [`PageError::Request`].
    pub async fn stats(&self) -> Result<CategoryStats, PageError> {
        self.state.begin_exclusive()?;
        let result = self.gateway.category_stats().await;
        finish(&self.ctx, &self.state, "Failed to load statistics", result)
    }
}

fn describe(summary: &RestoreSummary) -> String {
    let mut parts: Vec<String> = [
        ("imported", summary.imported_count),
        ("updated", summary.updated_count),
        ("skipped", summary.skipped_count),
        ("restored", summary.restored_count),
    ]
    .into_iter()
    .filter_map(|(label, count)| count.map(|count| format!("{count} {label}")))
    .collect();
    if !summary.errors.is_empty() {
        parts.push(format!("{} errors", summary.errors.len()));
    }
    if parts.is_empty() {
        "Restore completed".to_string()
    } else {
        format!("Restore completed: {}", parts.join(", "))
    }
}
