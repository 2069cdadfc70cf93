//! Poset registry: owns every live poset and issues their ids.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::interner::Interner;
use crate::relation::RelationGraph;

/// Identifier of a poset. Assigned in increasing order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PosetId(u64);

impl PosetId {
    /// Wrap a raw id, e.g. one received over the C ABI or from a script.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value of the id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PosetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps poset ids to their relation graphs.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    posets: BTreeMap<PosetId, RelationGraph>,
    next_id: u64,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new empty poset and return its id.
    pub fn create(&mut self) -> PosetId {
        let id = PosetId(self.next_id);
        self.next_id += 1;
        self.posets.insert(id, RelationGraph::new());
        id
    }

    /// Whether a poset with `id` is registered.
    pub fn exists(&self, id: PosetId) -> bool {
        self.posets.contains_key(&id)
    }

    /// The graph of a registered poset.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered; public callers check
    /// [`Registry::exists`] or use [`Registry::find`] instead.
    pub fn get(&self, id: PosetId) -> &RelationGraph {
        self.posets
            .get(&id)
            .unwrap_or_else(|| panic!("poset {id} is not registered"))
    }

    /// Mutable access to the graph of a registered poset.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not registered.
    pub fn get_mut(&mut self, id: PosetId) -> &mut RelationGraph {
        self.posets
            .get_mut(&id)
            .unwrap_or_else(|| panic!("poset {id} is not registered"))
    }

    /// The graph of `id`, if registered.
    pub fn find(&self, id: PosetId) -> Option<&RelationGraph> {
        self.posets.get(&id)
    }

    /// Mutable lookup of `id`, if registered.
    pub fn find_mut(&mut self, id: PosetId) -> Option<&mut RelationGraph> {
        self.posets.get_mut(&id)
    }

    /// Remove every element of `id`, keeping the poset registered.
    ///
    /// Each element's interner reference is released. Returns `false` if the
    /// poset does not exist.
    pub fn clear(&mut self, id: PosetId, interner: &mut Interner) -> bool {
        let Some(graph) = self.posets.get_mut(&id) else {
            return false;
        };
        for element in graph.drain() {
            interner.release_reference(element);
        }
        true
    }

    /// Release every element of `id` and unregister it.
    ///
    /// Returns `false` if the poset does not exist.
    pub fn destroy(&mut self, id: PosetId, interner: &mut Interner) -> bool {
        let Some(mut graph) = self.posets.remove(&id) else {
            return false;
        };
        for element in graph.drain() {
            interner.release_reference(element);
        }
        true
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = PosetId> + '_ {
        self.posets.keys().copied()
    }

    /// Number of registered posets.
    pub fn len(&self) -> usize {
        self.posets.len()
    }

    /// Whether no poset is registered.
    pub fn is_empty(&self) -> bool {
        self.posets.is_empty()
    }
}
