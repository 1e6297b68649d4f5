//! Client-side entry model and its mappings onto both endpoint families.

use std::fmt::{self, Display, Formatter};

use lexicon_api_models::{FlatRow, PromptId, PromptInput, PromptRecord, TermRecord};

/// Editable field of a glossary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Category name.
    Category,
    /// Source term.
    Term,
    /// Translation text.
    Translation,
    /// Free-form note.
    Note,
}

impl Field {
    /// Every field in column order.
    pub const ALL: [Self; 4] = [Self::Category, Self::Term, Self::Translation, Self::Note];

    /// Human-readable label used in notifications and accessibility labels.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Term => "Term",
            Self::Translation => "Translation",
            Self::Note => "Note",
        }
    }

    /// Column key used by DOM `data-field` attributes and CLI flags.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Term => "term",
            Self::Translation => "translation",
            Self::Note => "note",
        }
    }

    /// Inverse of [`Field::key`].
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Whether an entry may be persisted with this field empty.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::Note)
    }
}

/// One glossary row as held by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    /// Backend identifier; `None` for rows that were never saved.
    pub id: Option<PromptId>,
    /// Category name.
    pub category: String,
    /// Source term.
    pub term: String,
    /// Translation text.
    pub translation: String,
    /// Optional note.
    pub note: String,
}

impl Entry {
    /// Blank, unsaved row pre-filled with `category`.
    #[must_use]
    pub fn blank(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    /// Build an unsaved entry from its four text fields.
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        term: impl Into<String>,
        translation: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            category: category.into(),
            term: term.into(),
            translation: translation.into(),
            note: note.into(),
        }
    }

    /// Current value of `field`.
    #[must_use]
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Category => &self.category,
            Field::Term => &self.term,
            Field::Translation => &self.translation,
            Field::Note => &self.note,
        }
    }

    /// Replace the value of `field`.
    pub fn set_field(&mut self, field: Field, value: String) {
        match field {
            Field::Category => self.category = value,
            Field::Term => self.term = value,
            Field::Translation => self.translation = value,
            Field::Note => self.note = value,
        }
    }

    /// First field with no content, in column order.
    #[must_use]
    pub fn first_empty_field(&self) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|field| self.field(*field).trim().is_empty())
    }

    /// Whether the row survives save-time flattening.
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        Field::ALL
            .into_iter()
            .filter(|field| field.is_required())
            .all(|field| !self.field(field).trim().is_empty())
    }

    /// Identity used by selection models.
    #[must_use]
    pub fn selection_key(&self) -> SelectionKey {
        self.id.map_or_else(
            || SelectionKey::Text(self.translation.clone()),
            SelectionKey::Id,
        )
    }

    /// Legacy nested-write record (category carried by the map key).
    #[must_use]
    pub fn to_term_record(&self) -> TermRecord {
        TermRecord {
            term: self.term.trim().to_string(),
            trans: self.translation.trim().to_string(),
            note: self.note.trim().to_string(),
        }
    }

    /// Legacy term record placed under `category`.
    #[must_use]
    pub fn from_term(category: impl Into<String>, record: TermRecord) -> Self {
        Self::new(category, record.term, record.trans, record.note)
    }

    /// Create/update payload for the v1 prompt endpoints.
    #[must_use]
    pub fn to_prompt_input(&self) -> PromptInput {
        PromptInput {
            category: self.category.clone(),
            name: self.term.clone(),
            translation: self.translation.clone(),
            comment: self.note.clone(),
        }
    }
}

impl From<PromptRecord> for Entry {
    fn from(record: PromptRecord) -> Self {
        Self {
            id: Some(record.id),
            category: record.category,
            term: record.name,
            translation: record.translation,
            note: record.comment.unwrap_or_default(),
        }
    }
}

impl From<FlatRow> for Entry {
    fn from(row: FlatRow) -> Self {
        Self::new(row.category, row.term, row.trans, row.note)
    }
}

/// Identity of a selectable entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectionKey {
    /// Backend identifier.
    Id(PromptId),
    /// Translation text, used where the backend exposes no identifier.
    Text(String),
}

impl Display for SelectionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(formatter, "#{id}"),
            Self::Text(text) => formatter.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_record_maps_name_and_comment() {
        let entry = Entry::from(PromptRecord {
            id: PromptId(9),
            category: "Food".to_string(),
            name: "apple".to_string(),
            translation: "ringo".to_string(),
            comment: None,
            created_at: None,
            updated_at: None,
        });
        assert_eq!(entry.term, "apple");
        assert!(entry.note.is_empty());
        assert_eq!(entry.selection_key(), SelectionKey::Id(PromptId(9)));
    }

    #[test]
    fn unsaved_entries_are_keyed_by_translation() {
        let entry = Entry::new("Food", "apple", "ringo", "");
        assert_eq!(entry.selection_key(), SelectionKey::Text("ringo".to_string()));
    }

    #[test]
    fn persistable_requires_trimmed_required_fields() {
        assert!(Entry::new("Food", "apple", "ringo", "").is_persistable());
        assert!(!Entry::new("Food", "  ", "ringo", "note").is_persistable());
        assert!(!Entry::blank("Food").is_persistable());
    }

    #[test]
    fn first_empty_field_skips_filled_columns() {
        assert_eq!(Entry::blank("Food").first_empty_field(), Some(Field::Term));
        assert_eq!(Entry::blank("").first_empty_field(), Some(Field::Category));
        assert_eq!(
            Entry::new("a", "b", "c", "d").first_empty_field(),
            None
        );
    }

    #[test]
    fn field_keys_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key("comment"), None);
    }
}
