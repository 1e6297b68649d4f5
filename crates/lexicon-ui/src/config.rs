//! Tunables shared by the browser shell and the CLI.
//!
//! # Design
//! - Every field has a default so partial JSON overrides are accepted.
//! - Values are validated once at load; controllers trust them afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Field;

/// Records appended per render chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100;
/// Rows per page on the management screen.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Upper bound of terms fetched for the combine screen.
pub const DEFAULT_COMBINE_LIMIT: u32 = 1000;
/// Lifetime of a notification before it is swept.
pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 3000;
/// Default prefix prepended to combined prompts when enabled.
pub const DEFAULT_PROMPT_PREFIX: &str = "Nai";

/// Where the combine screen loads its terms from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CombineSource {
    /// `/api/v1/prompts`, selection keyed by id.
    #[default]
    V1,
    /// `/api/terms/{category}`, selection keyed by translation text.
    Legacy,
}

/// Maximum character counts per editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLimits {
    /// Category name limit.
    pub category: usize,
    /// Term limit.
    pub term: usize,
    /// Translation limit.
    pub translation: usize,
    /// Note limit.
    pub note: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            category: 20,
            term: 50,
            translation: 100,
            note: 200,
        }
    }
}

impl FieldLimits {
    /// Limit applied to `field`.
    #[must_use]
    pub const fn max_for(&self, field: Field) -> usize {
        match field {
            Field::Category => self.category,
            Field::Term => self.term,
            Field::Translation => self.translation,
            Field::Note => self.note,
        }
    }
}

/// Front-end configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Prefix joined to every request path; empty means same origin.
    pub api_base: String,
    /// Records appended per render chunk.
    pub chunk_size: usize,
    /// Rows per management page.
    pub page_size: u32,
    /// Terms fetched for the combine screen.
    pub combine_limit: u32,
    /// Notification lifetime in milliseconds.
    pub notification_ttl_ms: u64,
    /// Notifications kept on screen at once.
    pub max_notifications: usize,
    /// Delay before a search box change is applied.
    pub search_debounce_ms: u32,
    /// Prefix used by the combine screen's prefix toggle.
    pub prompt_prefix: String,
    /// Separator placed between combined translations.
    pub joiner: String,
    /// Per-field length limits.
    pub field_limits: FieldLimits,
    /// Source of combine-screen terms.
    pub combine_source: CombineSource,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            combine_limit: DEFAULT_COMBINE_LIMIT,
            notification_ttl_ms: DEFAULT_NOTIFICATION_TTL_MS,
            max_notifications: 5,
            search_debounce_ms: 300,
            prompt_prefix: DEFAULT_PROMPT_PREFIX.to_string(),
            joiner: crate::selection::DEFAULT_JOINER.to_string(),
            field_limits: FieldLimits::default(),
            combine_source: CombineSource::V1,
        }
    }
}

/// Errors raised while loading configuration.
///
/// # Design
/// - Parse failures keep the serde error as the source.
/// - Range failures name the offending key so the shell can log it verbatim.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be decoded.
    #[error("failed to parse configuration")]
    Parse {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// A value was outside its accepted range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Configuration key.
        field: &'static str,
        /// Constraint that was violated.
        reason: &'static str,
    },
}

impl UiConfig {
    /// Decode overrides from JSON on top of the defaults and validate them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|source| ConfigError::Parse { source })?;
        config.validated()
    }

    /// Normalise and range-check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let positive = [
            ("chunk_size", self.chunk_size == 0),
            ("page_size", self.page_size == 0),
            ("combine_limit", self.combine_limit == 0),
            ("max_notifications", self.max_notifications == 0),
            ("field_limits.category", self.field_limits.category == 0),
            ("field_limits.term", self.field_limits.term == 0),
            ("field_limits.translation", self.field_limits.translation == 0),
            ("field_limits.note", self.field_limits.note == 0),
        ];
        if let Some(&(field, _)) = positive.iter().find(|(_, zero)| *zero) {
            return Err(ConfigError::Invalid {
                field,
                reason: "must be greater than zero",
            });
        }
        if self.joiner.is_empty() {
            return Err(ConfigError::Invalid {
                field: "joiner",
                reason: "must not be empty",
            });
        }
        self.api_base = self.api_base.trim().trim_end_matches('/').to_string();
        self.prompt_prefix = self.prompt_prefix.trim().to_string();
        Ok(self)
    }

    /// Join `path` onto the configured API base.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() -> Result<(), ConfigError> {
        let config = UiConfig::from_json(r#"{"chunk_size": 25, "api_base": "http://host/"}"#)?;
        assert_eq!(config.chunk_size, 25);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.api_base, "http://host");
        assert_eq!(config.url("/api/data"), "http://host/api/data");
        assert_eq!(config.field_limits.max_for(Field::Note), 200);
        Ok(())
    }

    #[test]
    fn zero_values_are_rejected() {
        let err = UiConfig::from_json(r#"{"field_limits": {"note": 0}}"#)
            .err()
            .map(|err| err.to_string());
        assert_eq!(
            err.as_deref(),
            Some("invalid configuration value for field_limits.note: must be greater than zero")
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            UiConfig::from_json("{chunk_size"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn legacy_combine_source_parses() -> Result<(), ConfigError> {
        let config = UiConfig::from_json(r#"{"combine_source": "legacy"}"#)?;
        assert_eq!(config.combine_source, CombineSource::Legacy);
        Ok(())
    }
}
