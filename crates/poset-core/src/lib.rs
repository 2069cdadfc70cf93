//! Mutable partial orders over string-labelled elements.
//!
//! A [`PosetEngine`] manages any number of independent posets. Element
//! labels are shared across posets through a reference-counted
//! [`Interner`]; each poset stores only the relations that were asserted
//! (its witness edges) in a [`RelationGraph`] and answers transitive
//! queries by search rather than by materializing the closure.
//!
//! ```
//! use poset_core::PosetEngine;
//!
//! let mut engine = PosetEngine::default();
//! let p = engine.new_poset();
//! for label in ["A", "B", "C"] {
//!     engine.insert(p, label);
//! }
//! assert!(engine.add(p, "A", "B"));
//! assert!(engine.add(p, "B", "C"));
//! assert!(engine.test(p, "A", "C"));
//! assert!(!engine.add(p, "C", "A"));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod interner;
pub mod registry;
pub mod relation;
pub mod snapshot;
pub mod trace;

pub use config::EngineConfig;
pub use engine::PosetEngine;
pub use error::{PosetError, Result};
pub use interner::{ElementId, Interner};
pub use registry::{PosetId, Registry};
pub use relation::{Neighbours, Relation, RelationGraph, Retraction};
pub use snapshot::{PosetSnapshot, Witness};
pub use trace::{Trace, TraceMode};
