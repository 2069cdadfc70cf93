//! FFI error types.

/// Errors raised while reading arguments across the C boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FfiError {
    /// A label pointer was NULL.
    #[error("invalid value (NULL)")]
    NullPointer,

    /// A label was not valid UTF-8.
    #[error("invalid value (not UTF-8): {lossy}")]
    InvalidUtf8 { lossy: String },
}

/// Result type alias for FFI operations.
pub type Result<T> = std::result::Result<T, FfiError>;
