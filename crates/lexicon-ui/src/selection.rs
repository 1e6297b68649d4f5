//! Ordered selection of entries keyed by identity.
//!
//! Selection outlives re-renders: rows are re-marked from the model after every
//! `render`, never the other way around.

use std::collections::HashMap;
use std::hash::Hash;

use crate::models::Entry;

/// Separator used when combining selected translations.
pub const DEFAULT_JOINER: &str = ", ";

/// Text a snapshot contributes to the combined output.
pub trait OutputText {
    /// Output fragment for this snapshot.
    fn output_text(&self) -> &str;
}

impl OutputText for Entry {
    fn output_text(&self) -> &str {
        self.translation.trim()
    }
}

impl OutputText for String {
    fn output_text(&self) -> &str {
        self.trim()
    }
}

/// Tri-state of a select-all checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    /// No visible row is selected.
    Unchecked,
    /// Some but not all visible rows are selected.
    Indeterminate,
    /// Every visible row is selected.
    Checked,
}

impl HeaderState {
    /// Value for the checkbox `checked` property.
    #[must_use]
    pub const fn is_checked(self) -> bool {
        matches!(self, Self::Checked)
    }

    /// Value for the checkbox `indeterminate` property.
    #[must_use]
    pub const fn is_indeterminate(self) -> bool {
        matches!(self, Self::Indeterminate)
    }
}

/// Keys in first-selection order plus a snapshot per key.
#[derive(Debug, Clone)]
pub struct SelectionModel<K, V> {
    order: Vec<K>,
    snapshots: HashMap<K, V>,
}

impl<K, V> Default for SelectionModel<K, V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            snapshots: HashMap::new(),
        }
    }
}

impl<K, V> SelectionModel<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark or unmark `key`; returns whether membership changed.
    ///
    /// Re-selecting a selected key refreshes its snapshot but keeps its position.
    pub fn toggle(&mut self, key: K, snapshot: V, checked: bool) -> bool {
        if checked {
            self.select(key, snapshot)
        } else {
            self.remove(&key).is_some()
        }
    }

    /// Add `key` at the end of the order; returns whether it was new.
    pub fn select(&mut self, key: K, snapshot: V) -> bool {
        let added = !self.snapshots.contains_key(&key);
        if added {
            self.order.push(key.clone());
        }
        self.snapshots.insert(key, snapshot);
        added
    }

    /// Drop `key`, returning its snapshot. Unknown keys are a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let snapshot = self.snapshots.remove(key)?;
        self.order.retain(|existing| existing != key);
        Some(snapshot)
    }

    /// Forget every key.
    pub fn clear(&mut self) {
        self.order.clear();
        self.snapshots.clear();
    }

    /// Number of selected keys.
    #[must_use]
    pub fn count(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `key` is selected.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.snapshots.contains_key(key)
    }

    /// Selected keys in first-selection order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    /// Snapshots in first-selection order.
    pub fn snapshots(&self) -> impl Iterator<Item = &V> {
        self.order.iter().filter_map(|key| self.snapshots.get(key))
    }

    /// Snapshot stored for `key`.
    #[must_use]
    pub fn snapshot(&self, key: &K) -> Option<&V> {
        self.snapshots.get(key)
    }

    /// Keep only keys for which `keep` returns true.
    pub fn retain_keys(&mut self, mut keep: impl FnMut(&K) -> bool) {
        let snapshots = &mut self.snapshots;
        self.order.retain(|key| {
            let kept = keep(key);
            if !kept {
                snapshots.remove(key);
            }
            kept
        });
    }

    /// Select-all state over the currently visible keys.
    pub fn header_state<'a>(&self, visible: impl IntoIterator<Item = &'a K>) -> HeaderState
    where
        K: 'a,
    {
        let (total, selected) = visible.into_iter().fold((0_usize, 0_usize), |(total, selected), key| {
            (total + 1, selected + usize::from(self.contains(key)))
        });
        match selected {
            0 => HeaderState::Unchecked,
            count if count == total => HeaderState::Checked,
            _ => HeaderState::Indeterminate,
        }
    }
}

impl<K, V> SelectionModel<K, V>
where
    K: Eq + Hash + Clone,
    V: OutputText,
{
    /// Join snapshot texts in first-selection order.
    ///
    /// `prefix` is prepended with a single space when it is non-empty and
    /// the joined text is non-empty.
    #[must_use]
    pub fn serialize(&self, joiner: &str, prefix: Option<&str>) -> String {
        let joined = self
            .snapshots()
            .map(OutputText::output_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(joiner);
        match prefix.map(str::trim) {
            Some(prefix) if !prefix.is_empty() && !joined.is_empty() => {
                format!("{prefix} {joined}")
            }
            _ => joined,
        }
    }
}
