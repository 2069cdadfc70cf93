//! Witness-edge relation graph for a single poset.
//!
//! Each member element owns an adjacency map. A stored pair
//! `(u, v) = Greater` together with `(v, u) = Less` says that `u` is greater
//! than `v`, i.e. `v` precedes `u`. Only asserted relations (and the
//! reconnection edges introduced by removals) are stored; every transitive
//! consequence is recovered by depth-first search over `Greater` edges.
//!
//! The relation described by the edges, closed under reachability, is kept a
//! strict partial order at all times: an edge is only ever added between two
//! elements that are currently incomparable, and both removal algorithms only
//! add edges whose relation already held before the removal.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::interner::ElementId;

/// Direction of a stored edge, seen from the owning element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// The owner is greater than the neighbour.
    Greater,
    /// The owner is less than the neighbour.
    Less,
}

/// Outcome of an attempt to retract a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retraction {
    /// The edge was removed and its neighbourhood reconnected.
    Removed,
    /// `lower` does not precede `upper` at all.
    NotRelated,
    /// The relation is entailed by other edges and cannot be retracted.
    Implied,
}

/// Direct neighbours of an element, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbours {
    /// Elements the owner is directly greater than.
    pub less: Vec<ElementId>,
    /// Elements directly greater than the owner.
    pub greater: Vec<ElementId>,
}

/// Adjacency maps of one poset, keyed by member element.
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    adjacency: HashMap<ElementId, HashMap<ElementId, Relation>>,
}

impl RelationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of member elements.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the graph has no members.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: ElementId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Iterate over member elements, in no particular order.
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Iterate over stored witness edges as `(lower, upper)` pairs.
    pub fn witnesses(&self) -> impl Iterator<Item = (ElementId, ElementId)> + '_ {
        self.adjacency.iter().flat_map(|(&upper, edges)| {
            edges
                .iter()
                .filter(|(_, &rel)| rel == Relation::Greater)
                .map(move |(&lower, _)| (lower, upper))
        })
    }

    /// Number of stored witness edges.
    pub fn witness_count(&self) -> usize {
        self.witnesses().count()
    }

    /// Add `id` as an unrelated member. Returns `false` if already present.
    pub fn insert(&mut self, id: ElementId) -> bool {
        if self.adjacency.contains_key(&id) {
            return false;
        }
        self.adjacency.insert(id, HashMap::new());
        true
    }

    /// Drop every member and edge, returning the former members.
    pub fn drain(&mut self) -> Vec<ElementId> {
        self.adjacency.drain().map(|(id, _)| id).collect()
    }

    /// Whether `upper` is stored as directly greater than `lower`.
    pub fn directly_greater(&self, upper: ElementId, lower: ElementId) -> bool {
        self.adjacency
            .get(&upper)
            .and_then(|edges| edges.get(&lower))
            .is_some_and(|&rel| rel == Relation::Greater)
    }

    /// Direct neighbours of a member.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a member.
    pub fn neighbours(&self, id: ElementId) -> Neighbours {
        let mut result = Neighbours::default();
        for (&other, &rel) in self.member(id) {
            match rel {
                Relation::Greater => result.less.push(other),
                Relation::Less => result.greater.push(other),
            }
        }
        result
    }

    /// Whether `lower` precedes `upper`.
    ///
    /// Every element precedes itself. Otherwise the search walks `Greater`
    /// edges downward from `upper` looking for `lower`.
    ///
    /// # Panics
    ///
    /// Panics if either element is not a member.
    pub fn precedes(&self, lower: ElementId, upper: ElementId) -> bool {
        self.member(lower);
        if lower == upper {
            return true;
        }

        fn dfs(
            graph: &RelationGraph,
            node: ElementId,
            target: ElementId,
            visited: &mut HashSet<ElementId>,
        ) -> bool {
            if !visited.insert(node) {
                return false;
            }
            for (&next, &rel) in graph.member(node) {
                if rel != Relation::Greater {
                    continue;
                }
                if next == target || dfs(graph, next, target, visited) {
                    return true;
                }
            }
            false
        }

        dfs(self, upper, lower, &mut HashSet::new())
    }

    /// All elements `source` is greater than or equal to.
    ///
    /// # Panics
    ///
    /// Panics if `source` is not a member.
    pub fn reachable_from(&self, source: ElementId) -> HashSet<ElementId> {
        fn dfs(graph: &RelationGraph, node: ElementId, visited: &mut HashSet<ElementId>) {
            visited.insert(node);
            for (&next, &rel) in graph.member(node) {
                if rel == Relation::Greater && !visited.contains(&next) {
                    dfs(graph, next, visited);
                }
            }
        }

        let mut visited = HashSet::new();
        dfs(self, source, &mut visited);
        visited
    }

    /// Assert `lower` precedes `upper` if the two are incomparable.
    ///
    /// Returns `false`, leaving the graph untouched, when either direction
    /// already holds (which includes `lower == upper`).
    ///
    /// # Panics
    ///
    /// Panics if either element is not a member.
    pub fn relate(&mut self, lower: ElementId, upper: ElementId) -> bool {
        if self.precedes(lower, upper) || self.precedes(upper, lower) {
            return false;
        }
        self.link(upper, lower);
        true
    }

    /// Remove a member, reconnecting its neighbours.
    ///
    /// For every direct successor `g` and direct predecessor `l` of `id`,
    /// an edge `g > l` is added unless `l` is still reachable from `g`
    /// without passing through `id`. Every path that ran through the removed
    /// element is thereby preserved. Returns `false` if `id` is absent.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(edges) = self.adjacency.remove(&id) else {
            return false;
        };

        let mut less = Vec::new();
        let mut greater = Vec::new();
        for (other, rel) in edges {
            self.member_mut(other).remove(&id);
            match rel {
                Relation::Greater => less.push(other),
                Relation::Less => greater.push(other),
            }
        }

        for &g in &greater {
            for &l in &less {
                if !self.precedes(l, g) {
                    self.link(g, l);
                }
            }
        }
        true
    }

    /// Retract "`lower` precedes `upper`".
    ///
    /// Only a stored witness edge whose relation is not entailed by other
    /// paths can be retracted. After removing it, each direct predecessor of
    /// `lower` is linked below `upper` and each direct successor of `upper`
    /// is linked above `lower`, so every other relation survives.
    ///
    /// # Panics
    ///
    /// Panics if either element is not a member.
    pub fn retract(&mut self, lower: ElementId, upper: ElementId) -> Retraction {
        if !self.precedes(lower, upper) {
            return Retraction::NotRelated;
        }
        if !self.directly_greater(upper, lower) {
            return Retraction::Implied;
        }

        self.unlink(upper, lower);
        if self.precedes(lower, upper) {
            self.link(upper, lower);
            return Retraction::Implied;
        }

        let below = self.neighbours(lower).less;
        for l in below {
            if !self.precedes(l, upper) {
                self.link(upper, l);
            }
        }
        let above = self.neighbours(upper).greater;
        for g in above {
            if !self.precedes(lower, g) {
                self.link(g, lower);
            }
        }
        Retraction::Removed
    }

    fn link(&mut self, upper: ElementId, lower: ElementId) {
        debug_assert_ne!(upper, lower, "self-loop on {upper}");
        self.member_mut(upper).insert(lower, Relation::Greater);
        self.member_mut(lower).insert(upper, Relation::Less);
    }

    fn unlink(&mut self, upper: ElementId, lower: ElementId) {
        self.member_mut(upper).remove(&lower);
        self.member_mut(lower).remove(&upper);
    }

    fn member(&self, id: ElementId) -> &HashMap<ElementId, Relation> {
        self.adjacency
            .get(&id)
            .unwrap_or_else(|| panic!("element {id} is not a member of this poset"))
    }

    fn member_mut(&mut self, id: ElementId) -> &mut HashMap<ElementId, Relation> {
        self.adjacency
            .get_mut(&id)
            .unwrap_or_else(|| panic!("element {id} is not a member of this poset"))
    }
}
