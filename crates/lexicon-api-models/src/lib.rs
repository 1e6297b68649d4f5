#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
//! Shared HTTP DTOs for the Lexicon glossary API.
//!
//! Two endpoint families coexist on the backend: the `/api/v1` family wraps
//! every payload in a `{code, message, data}` envelope, while the legacy
//! `/api` family answers with bare JSON arrays or `{status, msg}` objects.
//! Both shapes are modelled here so the browser shell and the CLI decode the
//! same contract.
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Opaque backend identifier for a persisted glossary entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PromptId(pub i64);

impl Display for PromptId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Response envelope used by every `/api/v1` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    /// Application status code mirrored from the HTTP status.
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Human-readable outcome message.
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    /// Payload on success; absent on most error responses.
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Per-field validation messages when the server rejected input.
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Server timestamp for the response.
    pub timestamp: Option<String>,
}

impl<T> Envelope<T> {
    /// Whether the envelope code reports success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        is_success_code(self.code)
    }
}

/// Success range shared by the envelope `code` field and HTTP statuses.
#[must_use]
pub const fn is_success_code(code: i64) -> bool {
    code >= 200 && code < 300
}

/// Outcome object returned by legacy write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LegacyStatus {
    /// `ok` or `error`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Failure description supplied with `error`.
    pub msg: Option<String>,
}

impl LegacyStatus {
    /// Whether the status marks success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Persisted glossary entry as exposed by `/api/v1/prompts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptRecord {
    /// Backend identifier.
    pub id: PromptId,
    #[serde(default)]
    /// Category name (omitted by the combine listing).
    pub category: String,
    /// Source term.
    pub name: String,
    /// Translation text used when combining prompts.
    pub translation: String,
    #[serde(default)]
    /// Free-form annotation; the backend may return `null`.
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Creation timestamp as rendered by the backend.
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Last update timestamp as rendered by the backend.
    pub updated_at: Option<String>,
}

/// Create/update payload for `/api/v1/prompts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PromptInput {
    /// Category name.
    pub category: String,
    /// Source term.
    pub name: String,
    /// Translation text.
    pub translation: String,
    #[serde(default)]
    /// Free-form annotation.
    pub comment: String,
}

/// Pagination block attached to prompt listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number served.
    pub page: u32,
    /// Page size applied by the server (clamped to its maximum).
    pub limit: u32,
    /// Total matching rows.
    pub total: u64,
    /// Total pages for the current filter.
    pub pages: u32,
}

/// Paginated prompt listing payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptPage {
    /// Rows on the requested page.
    pub prompts: Vec<PromptRecord>,
    /// Window metadata for the listing.
    pub pagination: Pagination,
}

/// Server-side ordering for prompt listings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Alphabetical by name.
    NameAsc,
    /// Newest first.
    #[default]
    CreatedDesc,
}

impl SortOrder {
    /// Query-string value understood by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NameAsc => "name_asc",
            Self::CreatedDesc => "created_desc",
        }
    }
}

/// Filter and window parameters for `GET /api/v1/prompts`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PromptQuery {
    /// Restrict to one category; empty means all categories.
    pub category: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// Ordering.
    pub sort: Option<SortOrder>,
    /// Keyword for the search endpoint.
    pub keyword: Option<String>,
}

impl PromptQuery {
    /// Ordered query pairs, skipping unset and empty values.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(keyword) = self.keyword.as_deref().filter(|value| !value.is_empty()) {
            pairs.push(("keyword", keyword.to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|value| !value.is_empty()) {
            pairs.push(("category", category.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        pairs
    }
}

/// Category row returned by `GET /api/v1/categories`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategorySummary {
    /// Positional identifier assigned per response.
    pub id: u32,
    /// Category name.
    pub name: String,
    /// Number of entries in the category.
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Timestamp of the oldest entry.
    pub created_at: Option<String>,
}

/// Aggregate counters from `GET /api/v1/categories/stats`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CategoryStats {
    /// Distinct categories.
    pub total_categories: u64,
    /// Entries across all categories.
    pub total_prompts: u64,
    /// Entries created during the last seven days.
    pub recent_added: u64,
}

/// Body for `DELETE /api/v1/prompts/batch`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchDeleteRequest {
    /// Identifiers to delete.
    pub ids: Vec<PromptId>,
}

/// Payload returned by a batch delete.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchDeleteResult {
    /// Rows actually removed by the backend.
    pub deleted_count: u64,
}

/// Flattened row served by `GET /api/data?category=` for the table editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FlatRow {
    /// Category name.
    #[serde(default)]
    pub category: String,
    /// Source term.
    #[serde(default)]
    pub term: String,
    /// Translation text.
    #[serde(default)]
    pub trans: String,
    /// Optional annotation.
    #[serde(default)]
    pub note: String,
}

/// Category-less term record used by the legacy nested write and term listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TermRecord {
    /// Source term.
    #[serde(default)]
    pub term: String,
    /// Translation text.
    #[serde(default)]
    pub trans: String,
    /// Optional annotation.
    #[serde(default)]
    pub note: String,
}

/// Category name mapped to its term records.
pub type NestedTerms = BTreeMap<String, Vec<TermRecord>>;

/// Body for `POST /api/data`: editor rows nested by category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EditorSaveRequest {
    /// Every valid editor row grouped by its (possibly edited) category.
    #[serde(rename = "editorData")]
    pub editor_data: NestedTerms,
    /// Category the editor was loaded with; the backend replaces it wholesale.
    #[serde(rename = "loadedCategory")]
    pub loaded_category: String,
}

/// Body for `POST /api/sort`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortRequest {
    /// Category to re-sort on the server.
    pub category: String,
}

/// Backup file format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BackupFormat {
    /// Spreadsheet-friendly CSV export.
    Csv,
    /// Raw database file.
    Db,
}

impl BackupFormat {
    /// Path segment used by the backup endpoints.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Db => "db",
        }
    }
}

/// Restore strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestoreMode {
    /// Merge into existing data.
    #[default]
    Increment,
    /// Discard existing data first.
    Replace,
}

impl RestoreMode {
    /// Wire value used in paths and form fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::Replace => "replace",
        }
    }

    /// Whether the mode destroys existing data.
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(self, Self::Replace)
    }
}

/// Counters reported by the restore endpoints; fields vary per format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RestoreSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Rows inserted (CSV).
    pub imported_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Rows updated in place (CSV increment).
    pub updated_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Rows skipped as invalid (CSV).
    pub skipped_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Rows present after a database restore.
    pub restored_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Mode echoed by the database restore.
    pub mode: Option<RestoreMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// First few row-level errors.
    pub errors: Vec<String>,
}

/// One entry from `GET /api/v1/backup/history`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupHistoryEntry {
    /// History row identifier.
    pub id: i64,
    /// Operation label such as `csv_increment` or `db_replace`.
    pub operation: String,
    /// Uploaded file name.
    pub filename: String,
    #[serde(default)]
    /// Rows imported by the operation.
    pub imported_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// When the restore ran.
    pub timestamp: Option<String>,
}
