//! Serializable view of a poset's members and witness edges.

use serde::{Deserialize, Serialize};

use crate::interner::Interner;
use crate::registry::PosetId;
use crate::relation::RelationGraph;

/// A stored witness edge: `lower` precedes `upper`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Witness {
    pub lower: String,
    pub upper: String,
}

/// Members and direct edges of one poset, sorted by label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosetSnapshot {
    pub id: PosetId,
    pub elements: Vec<String>,
    pub witnesses: Vec<Witness>,
}

impl PosetSnapshot {
    /// Capture `graph` with labels resolved through `interner`.
    ///
    /// # Panics
    ///
    /// Panics if a member of `graph` has no interned label.
    pub fn capture(id: PosetId, graph: &RelationGraph, interner: &Interner) -> Self {
        let label = |element| {
            interner
                .label(element)
                .unwrap_or_else(|| panic!("poset {id} member {element} has no interned label"))
                .to_string()
        };

        let mut elements: Vec<String> = graph.elements().map(label).collect();
        elements.sort();

        let mut witnesses: Vec<Witness> = graph
            .witnesses()
            .map(|(lower, upper)| Witness {
                lower: label(lower),
                upper: label(upper),
            })
            .collect();
        witnesses.sort();

        Self {
            id,
            elements,
            witnesses,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_sorts_labels_and_edges() {
        let mut interner = Interner::new();
        let mut graph = RelationGraph::new();
        let ids: Vec<_> = ["C", "A", "B"]
            .iter()
            .map(|l| {
                let id = interner.intern(l, true).unwrap();
                interner.add_reference(id);
                graph.insert(id);
                id
            })
            .collect();
        // A < B, B < C
        graph.relate(ids[1], ids[2]);
        graph.relate(ids[2], ids[0]);

        let snap = PosetSnapshot::capture(PosetId::new(4), &graph, &interner);
        assert_eq!(snap.elements, vec!["A", "B", "C"]);
        assert_eq!(
            snap.witnesses,
            vec![
                Witness {
                    lower: "A".into(),
                    upper: "B".into()
                },
                Witness {
                    lower: "B".into(),
                    upper: "C".into()
                },
            ]
        );
    }

    #[test]
    fn json_shape() {
        let snap = PosetSnapshot {
            id: PosetId::new(1),
            elements: vec!["x".into()],
            witnesses: Vec::new(),
        };
        let value: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["elements"][0], "x");
        assert!(value["witnesses"].as_array().unwrap().is_empty());
    }
}
