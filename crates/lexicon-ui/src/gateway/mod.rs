//! Remote data gateway: the single choke point for network reads and writes.
//!
//! # Design
//! - Each call is attempted exactly once; retry policy belongs to callers.
//! - Every response goes through [`normalize`], so callers see one error type.
//! - The per-category cache is written only after an awaited call completes
//!   and never while a `RefCell` borrow spans an await.

mod envelope;
mod transport;

use std::cell::RefCell;
use std::collections::HashMap;

use lexicon_api_models::{
    BackupFormat, BackupHistoryEntry, BatchDeleteRequest, BatchDeleteResult, CategoryStats,
    CategorySummary, EditorSaveRequest, FlatRow, NestedTerms, PromptId, PromptInput, PromptPage,
    PromptQuery, PromptRecord, RestoreMode, RestoreSummary, SortRequest, TermRecord,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::Entry;

pub use envelope::{RequestError, normalize};
pub use transport::{
    Body, FormField, HttpRequest, HttpResponse, Method, Transport, TransportError,
};

/// Typed client over a [`Transport`] with a per-category read cache.
pub struct Gateway<T> {
    transport: T,
    base: String,
    cache: RefCell<HashMap<String, Vec<Entry>>>,
}

impl<T: Transport> Gateway<T> {
    /// Gateway prefixing every path with `base` (empty for same origin).
    #[must_use]
    pub fn new(transport: T, base: &str) -> Self {
        Self {
            transport,
            base: base.trim_end_matches('/').to_string(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Issue one request and normalise the response.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on transport failure, non-2xx status, an
    /// application error flag, or an undecodable body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<Value, RequestError> {
        let response = self.send_raw(method, path, body).await?;
        normalize(&response).inspect_err(|err| {
            tracing::warn!(
                method = method.as_str(),
                path,
                status = err.status,
                error = %err,
                "request failed"
            );
        })
    }

    async fn send_raw(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<HttpResponse, RequestError> {
        let request = HttpRequest {
            method,
            url: self.url(path),
            body,
        };
        tracing::debug!(method = method.as_str(), path, "sending request");
        self.transport.send(request).await.map_err(|err| {
            tracing::warn!(method = method.as_str(), path, error = %err, "transport failed");
            RequestError::new(err.message, None)
        })
    }

    async fn fetch<D: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<D, RequestError> {
        let value = self.request(method, path, body).await?;
        serde_json::from_value(value).map_err(|err| RequestError::malformed(err, None))
    }

    // Categories ----------------------------------------------------------

    /// Canonical, server-sorted category names from the v1 API.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn categories(&self) -> Result<Vec<String>, RequestError> {
        Ok(self
            .category_summaries()
            .await?
            .into_iter()
            .map(|summary| summary.name)
            .collect())
    }

    /// Category rows with counts.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn category_summaries(&self) -> Result<Vec<CategorySummary>, RequestError> {
        self.fetch(Method::Get, "/api/v1/categories", Body::Empty)
            .await
    }

    /// Category names from the legacy endpoint.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn legacy_categories(&self) -> Result<Vec<String>, RequestError> {
        self.fetch(Method::Get, "/api/categories", Body::Empty)
            .await
    }

    /// Aggregate counters.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn category_stats(&self) -> Result<CategoryStats, RequestError> {
        self.fetch(Method::Get, "/api/v1/categories/stats", Body::Empty)
            .await
    }

    // Legacy table editor ---------------------------------------------------

    /// Flattened rows of one category, served from cache when present.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`]; failures leave the cache untouched.
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Entry>, RequestError> {
        if let Some(hit) = self.cache.borrow().get(category) {
            tracing::debug!(category, rows = hit.len(), "category cache hit");
            return Ok(hit.clone());
        }
        let path = format!("/api/data?category={}", urlencoding::encode(category));
        let rows: Vec<FlatRow> = self.fetch(Method::Get, &path, Body::Empty).await?;
        let entries: Vec<Entry> = rows
            .into_iter()
            .map(|row| {
                let mut entry = Entry::from(row);
                if entry.category.is_empty() {
                    entry.category = category.to_string();
                }
                entry
            })
            .collect();
        self.cache
            .borrow_mut()
            .insert(category.to_string(), entries.clone());
        Ok(entries)
    }

    /// Nested write of editor rows; the backend replaces `loaded_category`.
    ///
    /// On success the cache entries for every written category and for
    /// `loaded_category` are evicted.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`]; failures leave the cache untouched.
    pub async fn save(
        &self,
        nested: &NestedTerms,
        loaded_category: &str,
    ) -> Result<(), RequestError> {
        let request = EditorSaveRequest {
            editor_data: nested.clone(),
            loaded_category: loaded_category.to_string(),
        };
        self.request(Method::Post, "/api/data", json_body(&request)?)
            .await?;
        let mut cache = self.cache.borrow_mut();
        cache.remove(loaded_category);
        for category in nested.keys() {
            cache.remove(category);
        }
        tracing::info!(
            loaded_category,
            categories = nested.len(),
            "editor data saved"
        );
        Ok(())
    }

    /// Ask the server to re-sort one category.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn sort_category(&self, category: &str) -> Result<(), RequestError> {
        let request = SortRequest {
            category: category.to_string(),
        };
        self.request(Method::Post, "/api/sort", json_body(&request)?)
            .await?;
        self.invalidate(category);
        Ok(())
    }

    /// Terms of one category from the legacy combine endpoint.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn terms(&self, category: &str) -> Result<Vec<TermRecord>, RequestError> {
        let path = format!("/api/terms/{}", urlencoding::encode(category));
        self.fetch(Method::Get, &path, Body::Empty).await
    }

    /// Multipart submit of one entry to the legacy input endpoint.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`], including `{status: "error"}` replies.
    pub async fn add_entry(&self, entry: &Entry) -> Result<(), RequestError> {
        let form = vec![
            FormField::text("category", entry.category.clone()),
            FormField::text("term", entry.term.clone()),
            FormField::text("trans", entry.translation.clone()),
            FormField::text("note", entry.note.clone()),
        ];
        self.request(Method::Post, "/api/add_entry", Body::Form(form))
            .await?;
        self.invalidate(&entry.category);
        Ok(())
    }

    /// Drop the cached rows of `category`.
    pub fn invalidate(&self, category: &str) {
        self.cache.borrow_mut().remove(category);
    }

    /// Whether `category` is currently cached.
    #[must_use]
    pub fn is_cached(&self, category: &str) -> bool {
        self.cache.borrow().contains_key(category)
    }

    // v1 prompts --------------------------------------------------------------

    /// One page of prompts.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn list_prompts(&self, query: &PromptQuery) -> Result<PromptPage, RequestError> {
        let path = with_query("/api/v1/prompts", &query.pairs());
        self.fetch(Method::Get, &path, Body::Empty).await
    }

    /// Keyword search over name, translation and comment.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn search_prompts(&self, query: &PromptQuery) -> Result<PromptPage, RequestError> {
        let path = with_query("/api/v1/prompts/search", &query.pairs());
        self.fetch(Method::Get, &path, Body::Empty).await
    }

    /// Single prompt detail.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn prompt(&self, id: PromptId) -> Result<PromptRecord, RequestError> {
        self.fetch(Method::Get, &format!("/api/v1/prompts/{id}"), Body::Empty)
            .await
    }

    /// Create a prompt.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn create_prompt(&self, input: &PromptInput) -> Result<PromptRecord, RequestError> {
        let record: PromptRecord = self
            .fetch(Method::Post, "/api/v1/prompts", json_body(input)?)
            .await?;
        self.invalidate(&record.category);
        tracing::info!(id = %record.id, category = %record.category, "prompt created");
        Ok(record)
    }

    /// Update a prompt.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn update_prompt(
        &self,
        id: PromptId,
        input: &PromptInput,
    ) -> Result<PromptRecord, RequestError> {
        let record: PromptRecord = self
            .fetch(
                Method::Put,
                &format!("/api/v1/prompts/{id}"),
                json_body(input)?,
            )
            .await?;
        self.invalidate(&input.category);
        tracing::info!(%id, "prompt updated");
        Ok(record)
    }

    /// Delete one prompt.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn delete_prompt(&self, id: PromptId) -> Result<(), RequestError> {
        self.request(Method::Delete, &format!("/api/v1/prompts/{id}"), Body::Empty)
            .await?;
        tracing::info!(%id, "prompt deleted");
        Ok(())
    }

    /// Delete several prompts in one call.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn delete_prompts(&self, ids: &[PromptId]) -> Result<BatchDeleteResult, RequestError> {
        let request = BatchDeleteRequest { ids: ids.to_vec() };
        let result: BatchDeleteResult = self
            .fetch(Method::Delete, "/api/v1/prompts/batch", json_body(&request)?)
            .await?;
        tracing::info!(requested = ids.len(), deleted = result.deleted_count, "prompts deleted");
        Ok(result)
    }

    // Backup ---------------------------------------------------------------------

    /// Download URL for an export; the browser navigates to it.
    #[must_use]
    pub fn export_url(&self, format: BackupFormat, category: Option<&str>) -> String {
        self.url(&export_path(format, category))
    }

    /// Fetch an export as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on transport failure or a non-2xx status.
    pub async fn download(
        &self,
        format: BackupFormat,
        category: Option<&str>,
    ) -> Result<Vec<u8>, RequestError> {
        let path = export_path(format, category);
        let response = self.send_raw(Method::Get, &path, Body::Empty).await?;
        if response.is_success() {
            return Ok(response.body);
        }
        Err(normalize(&response)
            .err()
            .unwrap_or_else(|| RequestError::new("download failed", Some(response.status))))
    }

    /// Restore from a CSV export.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn restore_csv(
        &self,
        mode: RestoreMode,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<RestoreSummary, RequestError> {
        let form = vec![file_field(filename, bytes)];
        let summary = self
            .fetch(
                Method::Post,
                &format!("/api/v1/backup/restore/csv/{}", mode.as_str()),
                Body::Form(form),
            )
            .await?;
        self.cache.borrow_mut().clear();
        Ok(summary)
    }

    /// Restore from a database file.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn restore_db(
        &self,
        mode: RestoreMode,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<RestoreSummary, RequestError> {
        let form = vec![
            file_field(filename, bytes),
            FormField::text("mode", mode.as_str()),
        ];
        let summary = self
            .fetch(Method::Post, "/api/v1/backup/restore/db", Body::Form(form))
            .await?;
        self.cache.borrow_mut().clear();
        Ok(summary)
    }

    /// Past restore operations, newest first.
    ///
    /// # Errors
    ///
    /// Propagates any [`RequestError`].
    pub async fn backup_history(&self) -> Result<Vec<BackupHistoryEntry>, RequestError> {
        self.fetch(Method::Get, "/api/v1/backup/history", Body::Empty)
            .await
    }
}

fn export_path(format: BackupFormat, category: Option<&str>) -> String {
    let path = format!("/api/v1/backup/export/{}", format.as_str());
    match (format, category.map(str::trim)) {
        (BackupFormat::Csv, Some(category)) if !category.is_empty() => {
            with_query(&path, &[("category", category.to_string())])
        }
        _ => path,
    }
}

fn json_body<B: Serialize>(body: &B) -> Result<Body, RequestError> {
    serde_json::to_value(body)
        .map(Body::Json)
        .map_err(|err| RequestError::new(format!("failed to encode request: {err}"), None))
}

fn file_field(filename: &str, bytes: Vec<u8>) -> FormField {
    FormField::File {
        name: "file".to_string(),
        filename: filename.to_string(),
        bytes,
    }
}

/// Append URL-encoded `pairs` to `path`.
#[must_use]
pub fn with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_query_encodes_values() {
        assert_eq!(
            with_query("/api/v1/prompts", &[("category", "动物 & co".to_string())]),
            "/api/v1/prompts?category=%E5%8A%A8%E7%89%A9%20%26%20co"
        );
        assert_eq!(with_query("/x", &[]), "/x");
    }
}
