//! Reference-counted label interner.
//!
//! Every element label used by any poset is mapped to a small [`ElementId`].
//! The mapping carries a count of the (poset, element) memberships that use
//! it and is erased as soon as that count drops to zero. Ids come from a
//! monotonically increasing counter, so an id is never handed to a different
//! label while the first mapping is still alive.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of an interned label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(u64);

impl ElementId {
    /// Raw numeric value of the id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    label: String,
    references: usize,
}

/// Bidirectional label ↔ id map with per-id reference counts.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    ids: HashMap<String, ElementId>,
    entries: HashMap<ElementId, Entry>,
    last_id: u64,
}

impl Interner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `label` to its id.
    ///
    /// When the label is unknown and `insert_if_absent` is set, a fresh id is
    /// allocated with a reference count of zero; the caller is expected to
    /// follow up with [`Interner::add_reference`]. Returns `None` when the
    /// label is unknown and insertion was not requested.
    pub fn intern(&mut self, label: &str, insert_if_absent: bool) -> Option<ElementId> {
        if let Some(&id) = self.ids.get(label) {
            return Some(id);
        }
        if !insert_if_absent {
            return None;
        }
        Some(self.allocate(label))
    }

    /// Intern `label` (allocating if needed) and take one reference to it.
    pub fn acquire(&mut self, label: &str) -> ElementId {
        let id = match self.ids.get(label) {
            Some(&id) => id,
            None => self.allocate(label),
        };
        self.add_reference(id);
        id
    }

    fn allocate(&mut self, label: &str) -> ElementId {
        self.last_id += 1;
        let id = ElementId(self.last_id);
        self.ids.insert(label.to_string(), id);
        self.entries.insert(
            id,
            Entry {
                label: label.to_string(),
                references: 0,
            },
        );
        id
    }

    /// Look up a label without allocating.
    pub fn lookup(&self, label: &str) -> Option<ElementId> {
        self.ids.get(label).copied()
    }

    /// Reverse lookup: the label an id stands for.
    pub fn label(&self, id: ElementId) -> Option<&str> {
        self.entries.get(&id).map(|e| e.label.as_str())
    }

    /// Current reference count of `id`, or `None` when it is not mapped.
    pub fn references(&self, id: ElementId) -> Option<usize> {
        self.entries.get(&id).map(|e| e.references)
    }

    /// Record one more membership using `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not mapped.
    pub fn add_reference(&mut self, id: ElementId) {
        let entry = self
            .entries
            .get_mut(&id)
            .unwrap_or_else(|| panic!("add_reference on unmapped element {id}"));
        entry.references += 1;
    }

    /// Drop one membership using `id`, erasing the mapping when none remain.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not mapped or its count is already zero.
    pub fn release_reference(&mut self, id: ElementId) {
        let entry = self
            .entries
            .get_mut(&id)
            .unwrap_or_else(|| panic!("release_reference on unmapped element {id}"));
        assert!(
            entry.references > 0,
            "release_reference on element {id} with no references"
        );

        entry.references -= 1;
        if entry.references == 0 {
            if let Some(entry) = self.entries.remove(&id) {
                self.ids.remove(&entry.label);
            }
        }
    }

    /// Number of labels currently mapped.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no label is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all mapped labels, in no particular order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.ids.keys().map(String::as_str)
    }
}
