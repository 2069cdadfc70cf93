//! Error types for poset operations.

use crate::registry::PosetId;

/// Reasons a poset operation was rejected.
///
/// These are caller-input errors. Broken engine invariants are not reported
/// through this type; they panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PosetError {
    #[error("poset {0} does not exist")]
    PosetNotFound(PosetId),

    #[error("poset {poset}, element \"{label}\" does not exist")]
    ElementNotFound { poset: PosetId, label: String },

    #[error("poset {poset}, element \"{label}\" already exists")]
    AlreadyPresent { poset: PosetId, label: String },

    #[error("poset {poset}, relation (\"{lower}\", \"{upper}\") cannot be added")]
    AlreadyRelated {
        poset: PosetId,
        lower: String,
        upper: String,
    },

    #[error("poset {poset}, relation (\"{lower}\", \"{upper}\") does not exist")]
    NotRelated {
        poset: PosetId,
        lower: String,
        upper: String,
    },

    #[error("poset {poset}, relation (\"{lower}\", \"{upper}\") cannot be deleted")]
    RelationImplied {
        poset: PosetId,
        lower: String,
        upper: String,
    },
}

/// Result type alias for poset operations.
pub type Result<T> = std::result::Result<T, PosetError>;
