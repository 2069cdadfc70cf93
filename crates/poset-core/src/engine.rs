//! The public query/mutation surface.
//!
//! [`PosetEngine`] owns one [`Interner`] and one [`Registry`] and exposes the
//! poset operations. Each operation comes in two forms:
//!
//! - `try_*` returns a [`Result`] naming why a call was rejected;
//! - the plain form returns the boolean (or count) outcome and writes the
//!   call and its outcome to the diagnostic [`Trace`].
//!
//! Caller mistakes (missing poset, missing element, duplicate insert,
//! conflicting relation) never panic. A panic out of the engine means one of
//! its own invariants was broken.

use crate::config::EngineConfig;
use crate::error::{PosetError, Result};
use crate::interner::{ElementId, Interner};
use crate::registry::{PosetId, Registry};
use crate::relation::{RelationGraph, Retraction};
use crate::snapshot::PosetSnapshot;
use crate::trace::{quote, Trace};

/// A self-contained set of posets sharing one label interner.
#[derive(Debug, Clone, Default)]
pub struct PosetEngine {
    config: EngineConfig,
    interner: Interner,
    registry: Registry,
    trace: Trace,
}

impl PosetEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            trace: Trace::new(config.trace),
            config,
            interner: Interner::new(),
            registry: Registry::new(),
        }
    }

    /// Configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared label interner.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// The poset registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The diagnostic trace.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Mutable access to the diagnostic trace, e.g. to toggle it.
    pub fn trace_mut(&mut self) -> &mut Trace {
        &mut self.trace
    }

    // --- Fallible operations ---

    /// Add `label` to `poset` as an element unrelated to all others.
    pub fn try_insert(&mut self, poset: PosetId, label: &str) -> Result<()> {
        let graph = self
            .registry
            .find_mut(poset)
            .ok_or(PosetError::PosetNotFound(poset))?;
        if self.interner.lookup(label).is_some_and(|id| graph.contains(id)) {
            return Err(PosetError::AlreadyPresent {
                poset,
                label: label.to_string(),
            });
        }

        let id = self.interner.acquire(label);
        graph.insert(id);
        Ok(())
    }

    /// Whether `lower` precedes `upper` in `poset`.
    ///
    /// Every element precedes itself.
    pub fn try_test(&self, poset: PosetId, lower: &str, upper: &str) -> Result<bool> {
        let (graph, lo, hi) = self.resolve_pair(poset, lower, upper)?;
        Ok(graph.precedes(lo, hi))
    }

    /// Assert that `lower` precedes `upper`.
    ///
    /// Fails with [`PosetError::AlreadyRelated`] if the two elements are
    /// already comparable in either direction.
    pub fn try_add(&mut self, poset: PosetId, lower: &str, upper: &str) -> Result<()> {
        let (_, lo, hi) = self.resolve_pair(poset, lower, upper)?;
        if self.registry.get_mut(poset).relate(lo, hi) {
            Ok(())
        } else {
            Err(PosetError::AlreadyRelated {
                poset,
                lower: lower.to_string(),
                upper: upper.to_string(),
            })
        }
    }

    /// Remove `label` from `poset`, keeping every relation that passed
    /// through it between the remaining elements.
    pub fn try_remove(&mut self, poset: PosetId, label: &str) -> Result<()> {
        let (_, id) = self.resolve(poset, label)?;
        let removed = self.registry.get_mut(poset).remove(id);
        assert!(removed, "poset {poset} lost element {id} during removal");
        self.interner.release_reference(id);
        Ok(())
    }

    /// Retract "`lower` precedes `upper`".
    ///
    /// Fails with [`PosetError::NotRelated`] when the relation does not hold
    /// and with [`PosetError::RelationImplied`] when other relations entail it.
    pub fn try_del(&mut self, poset: PosetId, lower: &str, upper: &str) -> Result<()> {
        let (_, lo, hi) = self.resolve_pair(poset, lower, upper)?;
        let pair = || (lower.to_string(), upper.to_string());
        match self.registry.get_mut(poset).retract(lo, hi) {
            Retraction::Removed => Ok(()),
            Retraction::NotRelated => {
                let (lower, upper) = pair();
                Err(PosetError::NotRelated {
                    poset,
                    lower,
                    upper,
                })
            }
            Retraction::Implied => {
                let (lower, upper) = pair();
                Err(PosetError::RelationImplied {
                    poset,
                    lower,
                    upper,
                })
            }
        }
    }

    // --- Traced operations ---

    /// Create a new empty poset.
    pub fn new_poset(&mut self) -> PosetId {
        self.trace.emit(|| "poset_new()".to_string());
        let id = self.registry.create();
        self.trace.emit(|| format!("poset_new: poset {id} created"));
        id
    }

    /// Traced [`PosetEngine::try_insert`].
    pub fn insert(&mut self, poset: PosetId, label: &str) -> bool {
        self.trace
            .emit(|| format!("poset_insert({poset}, {})", quote(Some(label))));
        let result = self.try_insert(poset, label);
        self.report("poset_insert", &result, |_| {
            format!("poset {poset}, element \"{label}\" inserted")
        });
        result.is_ok()
    }

    /// Traced [`PosetEngine::try_test`]. Rejected calls yield `false`.
    pub fn test(&mut self, poset: PosetId, lower: &str, upper: &str) -> bool {
        self.trace_pair_call("poset_test", poset, lower, upper);
        let result = self.try_test(poset, lower, upper);
        self.report("poset_test", &result, |&holds| {
            let verdict = if holds { "exists" } else { "does not exist" };
            format!("poset {poset}, relation (\"{lower}\", \"{upper}\") {verdict}")
        });
        result.unwrap_or(false)
    }

    /// Traced [`PosetEngine::try_add`].
    pub fn add(&mut self, poset: PosetId, lower: &str, upper: &str) -> bool {
        self.trace_pair_call("poset_add", poset, lower, upper);
        let result = self.try_add(poset, lower, upper);
        self.report("poset_add", &result, |_| {
            format!("poset {poset}, relation (\"{lower}\", \"{upper}\") added")
        });
        result.is_ok()
    }

    /// Traced [`PosetEngine::try_remove`].
    pub fn remove(&mut self, poset: PosetId, label: &str) -> bool {
        self.trace
            .emit(|| format!("poset_remove({poset}, {})", quote(Some(label))));
        let result = self.try_remove(poset, label);
        self.report("poset_remove", &result, |_| {
            format!("poset {poset}, element \"{label}\" removed")
        });
        result.is_ok()
    }

    /// Traced [`PosetEngine::try_del`].
    pub fn del(&mut self, poset: PosetId, lower: &str, upper: &str) -> bool {
        self.trace_pair_call("poset_del", poset, lower, upper);
        let result = self.try_del(poset, lower, upper);
        self.report("poset_del", &result, |_| {
            format!("poset {poset}, relation (\"{lower}\", \"{upper}\") deleted")
        });
        result.is_ok()
    }

    /// Number of elements in `poset`, or 0 if it does not exist.
    pub fn size(&mut self, poset: PosetId) -> usize {
        self.trace.emit(|| format!("poset_size({poset})"));
        match self.registry.find(poset) {
            Some(graph) => {
                let size = graph.len();
                self.trace
                    .emit(|| format!("poset_size: poset {poset} contains {size} element(s)"));
                size
            }
            None => {
                self.trace
                    .emit(|| format!("poset_size: {}", PosetError::PosetNotFound(poset)));
                0
            }
        }
    }

    /// Remove every element of `poset`, keeping the poset. No-op if absent.
    pub fn clear(&mut self, poset: PosetId) {
        self.trace.emit(|| format!("poset_clear({poset})"));
        if self.registry.clear(poset, &mut self.interner) {
            self.trace
                .emit(|| format!("poset_clear: poset {poset} cleared"));
        } else {
            self.trace
                .emit(|| format!("poset_clear: {}", PosetError::PosetNotFound(poset)));
        }
    }

    /// Destroy `poset`. No-op if absent.
    pub fn delete(&mut self, poset: PosetId) {
        self.trace.emit(|| format!("poset_delete({poset})"));
        if self.registry.destroy(poset, &mut self.interner) {
            self.trace
                .emit(|| format!("poset_delete: poset {poset} deleted"));
        } else {
            self.trace
                .emit(|| format!("poset_delete: {}", PosetError::PosetNotFound(poset)));
        }
    }

    // --- Read-only queries ---

    /// Whether `poset` exists.
    pub fn exists(&self, poset: PosetId) -> bool {
        self.registry.exists(poset)
    }

    /// Whether `label` is an element of `poset`.
    pub fn contains(&self, poset: PosetId, label: &str) -> bool {
        self.resolve(poset, label).is_ok()
    }

    /// Sorted element labels of `poset`.
    pub fn elements(&self, poset: PosetId) -> Option<Vec<String>> {
        self.snapshot(poset).map(|s| s.elements)
    }

    /// Members and witness edges of `poset`.
    pub fn snapshot(&self, poset: PosetId) -> Option<PosetSnapshot> {
        let graph = self.registry.find(poset)?;
        Some(PosetSnapshot::capture(poset, graph, &self.interner))
    }

    /// Ids of all live posets, ascending.
    pub fn poset_ids(&self) -> Vec<PosetId> {
        self.registry.ids().collect()
    }

    /// Every label referenced by at least one poset, sorted.
    pub fn interned_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.interner.labels().map(str::to_string).collect();
        labels.sort();
        labels
    }

    // --- Helpers ---

    fn resolve(&self, poset: PosetId, label: &str) -> Result<(&RelationGraph, ElementId)> {
        let graph = self
            .registry
            .find(poset)
            .ok_or(PosetError::PosetNotFound(poset))?;
        let id = self
            .interner
            .lookup(label)
            .filter(|&id| graph.contains(id))
            .ok_or_else(|| PosetError::ElementNotFound {
                poset,
                label: label.to_string(),
            })?;
        Ok((graph, id))
    }

    fn resolve_pair(
        &self,
        poset: PosetId,
        lower: &str,
        upper: &str,
    ) -> Result<(&RelationGraph, ElementId, ElementId)> {
        let (graph, lo) = self.resolve(poset, lower)?;
        let (_, hi) = self.resolve(poset, upper)?;
        Ok((graph, lo, hi))
    }

    fn trace_pair_call(&mut self, op: &str, poset: PosetId, lower: &str, upper: &str) {
        self.trace.emit(|| {
            format!(
                "{op}({poset}, {}, {})",
                quote(Some(lower)),
                quote(Some(upper))
            )
        });
    }

    fn report<T>(&mut self, op: &str, result: &Result<T>, success: impl FnOnce(&T) -> String) {
        self.trace.emit(|| match result {
            Ok(value) => format!("{op}: {}", success(value)),
            Err(err) => format!("{op}: {err}"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceMode;

    fn engine() -> PosetEngine {
        PosetEngine::default()
    }

    #[test]
    fn chain_scenario() {
        let mut e = engine();
        let p = e.new_poset();
        assert!(e.insert(p, "A"));
        assert!(e.insert(p, "B"));
        assert!(e.insert(p, "C"));

        assert!(e.add(p, "A", "B"));
        assert!(e.add(p, "B", "C"));
        assert!(e.test(p, "A", "C"));
        assert!(!e.add(p, "C", "A"));

        assert!(e.remove(p, "B"));
        assert!(e.test(p, "A", "C"));
        assert!(!e.test(p, "C", "A"));
        assert_eq!(e.size(p), 2);
    }

    #[test]
    fn insert_duplicate_and_missing_poset() {
        let mut e = engine();
        let p = e.new_poset();
        assert!(e.insert(p, "x"));
        assert_eq!(
            e.try_insert(p, "x"),
            Err(PosetError::AlreadyPresent {
                poset: p,
                label: "x".into()
            })
        );
        assert_eq!(
            e.try_insert(PosetId::new(99), "x"),
            Err(PosetError::PosetNotFound(PosetId::new(99)))
        );
        assert_eq!(e.size(p), 1);
    }

    #[test]
    fn test_is_reflexive_for_members_only() {
        let mut e = engine();
        let p = e.new_poset();
        e.insert(p, "A");
        assert!(e.test(p, "A", "A"));
        assert!(!e.test(p, "Z", "Z"));
        assert!(!e.test(PosetId::new(42), "A", "A"));
    }

    #[test]
    fn labels_are_isolated_between_posets() {
        let mut e = engine();
        let p = e.new_poset();
        let q = e.new_poset();
        e.insert(p, "A");
        e.insert(p, "B");
        e.insert(q, "A");

        assert!(!e.test(q, "A", "B"));
        assert!(e.add(p, "A", "B"));
        assert!(e.contains(p, "B"));
        assert!(!e.contains(q, "B"));
        assert!(!e.add(q, "A", "B"));
    }

    #[test]
    fn add_is_antisymmetric() {
        let mut e = engine();
        let p = e.new_poset();
        e.insert(p, "A");
        e.insert(p, "B");
        assert!(e.add(p, "A", "B"));
        assert!(e.test(p, "A", "B"));
        assert!(!e.test(p, "B", "A"));
        assert!(!e.add(p, "B", "A"));
        assert!(!e.add(p, "A", "B"));
        assert!(!e.add(p, "A", "A"));
    }

    #[test]
    fn reinsert_after_remove_is_unrelated() {
        let mut e = engine();
        let p = e.new_poset();
        e.insert(p, "x");
        e.insert(p, "y");
        e.add(p, "x", "y");

        assert!(e.remove(p, "x"));
        assert!(!e.remove(p, "x"));
        assert_eq!(e.size(p), 1);
        assert!(e.interner().lookup("x").is_none());

        assert!(e.insert(p, "x"));
        assert!(!e.test(p, "x", "y"));
        assert!(!e.test(p, "y", "x"));
    }

    #[test]
    fn del_direct_and_implied() {
        let mut e = engine();
        let p = e.new_poset();
        for l in ["A", "B", "C", "D"] {
            e.insert(p, l);
        }
        e.add(p, "A", "B");
        e.add(p, "B", "C");
        e.add(p, "C", "D");

        assert!(matches!(
            e.try_del(p, "A", "C"),
            Err(PosetError::RelationImplied { .. })
        ));
        assert!(matches!(
            e.try_del(p, "C", "A"),
            Err(PosetError::NotRelated { .. })
        ));
        assert!(!e.del(p, "A", "A"));

        assert!(e.del(p, "B", "C"));
        assert!(!e.test(p, "B", "C"));
        assert!(e.test(p, "A", "B"));
        assert!(e.test(p, "C", "D"));
        assert!(e.test(p, "A", "C"));
        assert!(e.test(p, "B", "D"));
        assert!(e.test(p, "A", "D"));
    }

    #[test]
    fn del_leaves_unrelated_pairs_alone() {
        let mut e = engine();
        let p = e.new_poset();
        for l in ["A", "B", "X", "Y"] {
            e.insert(p, l);
        }
        e.add(p, "A", "B");
        e.add(p, "X", "Y");

        assert!(e.del(p, "A", "B"));
        assert!(e.test(p, "X", "Y"));
        assert!(!e.test(p, "A", "X"));
        assert!(e.add(p, "B", "A"));
    }

    #[test]
    fn shared_labels_survive_other_posets() {
        let mut e = engine();
        let p = e.new_poset();
        let q = e.new_poset();
        e.insert(p, "A");
        e.insert(q, "A");
        let id = e.interner().lookup("A").unwrap();
        assert_eq!(e.interner().references(id), Some(2));

        e.insert(q, "B");
        assert_eq!(e.interned_labels(), vec!["A".to_string(), "B".to_string()]);

        e.delete(p);
        assert_eq!(e.interner().references(id), Some(1));
        assert!(e.contains(q, "A"));

        e.clear(q);
        assert!(e.interner().is_empty());
        assert!(e.exists(q));
    }

    #[test]
    fn size_clear_delete_on_missing() {
        let mut e = engine();
        let missing = PosetId::new(5);
        assert_eq!(e.size(missing), 0);
        e.clear(missing);
        e.delete(missing);

        let p = e.new_poset();
        e.delete(p);
        e.delete(p);
        assert_eq!(e.size(p), 0);
        assert!(!e.insert(p, "A"));
    }

    #[test]
    fn snapshot_and_elements() {
        let mut e = engine();
        let p = e.new_poset();
        e.insert(p, "b");
        e.insert(p, "a");
        e.add(p, "a", "b");

        assert_eq!(e.elements(p), Some(vec!["a".to_string(), "b".to_string()]));
        let snap = e.snapshot(p).unwrap();
        assert_eq!(snap.witnesses.len(), 1);
        assert_eq!(snap.witnesses[0].lower, "a");
        assert!(e.snapshot(PosetId::new(9)).is_none());
        assert_eq!(e.poset_ids(), vec![p]);
    }

    #[test]
    fn trace_lines_follow_calls() {
        let mut e = PosetEngine::new(EngineConfig::default().with_trace(TraceMode::Memory));
        let p = e.new_poset();
        e.insert(p, "A");
        e.insert(p, "A");
        e.insert(p, "B");
        e.add(p, "A", "B");
        e.test(p, "B", "A");
        e.size(PosetId::new(7));

        let lines = e.trace_mut().take_lines();
        assert_eq!(
            lines,
            vec![
                "poset_new()",
                "poset_new: poset 0 created",
                "poset_insert(0, \"A\")",
                "poset_insert: poset 0, element \"A\" inserted",
                "poset_insert(0, \"A\")",
                "poset_insert: poset 0, element \"A\" already exists",
                "poset_insert(0, \"B\")",
                "poset_insert: poset 0, element \"B\" inserted",
                "poset_add(0, \"A\", \"B\")",
                "poset_add: poset 0, relation (\"A\", \"B\") added",
                "poset_test(0, \"B\", \"A\")",
                "poset_test: poset 0, relation (\"B\", \"A\") does not exist",
                "poset_size(7)",
                "poset_size: poset 7 does not exist",
            ]
        );
    }

    #[test]
    fn trace_off_records_nothing() {
        let mut e = engine();
        let p = e.new_poset();
        e.insert(p, "A");
        assert!(e.trace().lines().is_empty());
    }
}
