//! Client-side field validation. Nothing here touches the network.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::config::FieldLimits;
use crate::models::{Entry, Field};

const FORBIDDEN_CATEGORY_PATTERN: &str = r"[/\\?#%\p{Cc}]";

static FORBIDDEN_CATEGORY_CHARS: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(FORBIDDEN_CATEGORY_PATTERN));

/// Input rejected before it reaches the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was empty after trimming.
    #[error("{} is required", .field.label())]
    Required {
        /// Offending field.
        field: Field,
    },
    /// The trimmed value exceeded the configured limit.
    #[error("{} cannot exceed {max} characters", .field.label())]
    TooLong {
        /// Offending field.
        field: Field,
        /// Configured maximum.
        max: usize,
    },
    /// Category names end up in URL paths and must avoid reserved characters.
    #[error("Category cannot contain {found:?}")]
    ForbiddenCharacter {
        /// First offending character.
        found: char,
    },
    /// An uploaded backup file does not match the requested format.
    #[error("expected a {expected} file")]
    FileType {
        /// Accepted extensions.
        expected: &'static str,
    },
    /// A built-in validation pattern failed to compile.
    #[error("invalid validation pattern {pattern}: {reason}")]
    PatternCompile {
        /// Pattern source.
        pattern: &'static str,
        /// Compiler message.
        reason: String,
    },
}

impl ValidationError {
    /// Field the error should be shown next to, when there is one.
    #[must_use]
    pub const fn field(&self) -> Option<Field> {
        match self {
            Self::Required { field } | Self::TooLong { field, .. } => Some(*field),
            Self::ForbiddenCharacter { .. } => Some(Field::Category),
            Self::FileType { .. } | Self::PatternCompile { .. } => None,
        }
    }
}

/// Trim `raw` and check it against the limit and character rules for `field`.
///
/// Emptiness is not checked here; see [`validate_entry`].
///
/// # Errors
///
/// Returns [`ValidationError::TooLong`] or [`ValidationError::ForbiddenCharacter`];
/// [`ValidationError::PatternCompile`] if the category pattern is broken.
pub fn validate_field(
    field: Field,
    raw: &str,
    limits: &FieldLimits,
) -> Result<String, ValidationError> {
    let value = raw.trim();
    let max = limits.max_for(field);
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    if field == Field::Category {
        if let Some(found) = forbidden_category_char(value)? {
            return Err(ValidationError::ForbiddenCharacter { found });
        }
    }
    Ok(value.to_string())
}

/// Validate every field of `entry`, returning a trimmed copy.
///
/// # Errors
///
/// Returns the first failing field in column order.
pub fn validate_entry(entry: &Entry, limits: &FieldLimits) -> Result<Entry, ValidationError> {
    let mut trimmed = entry.clone();
    for field in Field::ALL {
        let value = validate_field(field, entry.field(field), limits)?;
        if field.is_required() && value.is_empty() {
            return Err(ValidationError::Required { field });
        }
        trimmed.set_field(field, value);
    }
    Ok(trimmed)
}

/// Accept `filename` only when its extension is one of `extensions`.
///
/// # Errors
///
/// Returns [`ValidationError::FileType`] naming `expected`.
pub fn validate_file_name(
    filename: &str,
    extensions: &[&str],
    expected: &'static str,
) -> Result<(), ValidationError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension {
        Some(ext) if extensions.contains(&ext.as_str()) => Ok(()),
        _ => Err(ValidationError::FileType { expected }),
    }
}

fn forbidden_category_char(value: &str) -> Result<Option<char>, ValidationError> {
    let pattern = FORBIDDEN_CATEGORY_CHARS.as_ref().map_err(|source| {
        ValidationError::PatternCompile {
            pattern: FORBIDDEN_CATEGORY_PATTERN,
            reason: source.to_string(),
        }
    })?;
    Ok(pattern
        .find(value)
        .and_then(|found| found.as_str().chars().next()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_over_limit_names_the_label() {
        let raw = "x".repeat(201);
        let err = validate_field(Field::Note, &raw, &FieldLimits::default()).err();
        assert_eq!(
            err.as_ref().map(ToString::to_string).as_deref(),
            Some("Note cannot exceed 200 characters")
        );
        assert_eq!(err.and_then(|err| err.field()), Some(Field::Note));
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        let raw = "词".repeat(20);
        assert_eq!(
            validate_field(Field::Category, &raw, &FieldLimits::default()),
            Ok(raw)
        );
    }

    #[test]
    fn values_are_trimmed() {
        assert_eq!(
            validate_field(Field::Term, "  cat  ", &FieldLimits::default()),
            Ok("cat".to_string())
        );
    }

    #[test]
    fn category_rejects_path_characters() {
        assert_eq!(
            validate_field(Field::Category, "a/b", &FieldLimits::default()),
            Err(ValidationError::ForbiddenCharacter { found: '/' })
        );
        assert_eq!(
            validate_field(Field::Category, "tab\there", &FieldLimits::default()),
            Err(ValidationError::ForbiddenCharacter { found: '\t' })
        );
        assert!(validate_field(Field::Term, "a/b", &FieldLimits::default()).is_ok());
    }

    #[test]
    fn category_pattern_compiles_and_matches_each_reserved_character() {
        assert!(FORBIDDEN_CATEGORY_CHARS.is_ok());
        for reserved in ['/', '\\', '?', '#', '%', '\u{7f}'] {
            let value = format!("a{reserved}b");
            assert_eq!(forbidden_category_char(&value), Ok(Some(reserved)));
        }
        assert_eq!(forbidden_category_char("动物 & co"), Ok(None));
    }

    #[test]
    fn entry_requires_category_term_and_translation() {
        let limits = FieldLimits::default();
        let missing = Entry::new("Animals", "cat", " ", "");
        assert_eq!(
            validate_entry(&missing, &limits),
            Err(ValidationError::Required {
                field: Field::Translation
            })
        );
        let ok = validate_entry(&Entry::new(" Animals ", "cat", "neko", ""), &limits);
        assert_eq!(ok.map(|entry| entry.category), Ok("Animals".to_string()));
    }

    #[test]
    fn file_names_are_checked_case_insensitively() {
        assert!(validate_file_name("backup.CSV", &["csv"], "CSV").is_ok());
        assert_eq!(
            validate_file_name("backup", &["csv"], "CSV"),
            Err(ValidationError::FileType { expected: "CSV" })
        );
    }
}
