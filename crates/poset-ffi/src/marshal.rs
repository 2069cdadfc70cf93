//! Conversion of C string arguments into Rust labels.

use std::ffi::{c_char, CStr};

use crate::error::{FfiError, Result};

/// Borrow a NUL-terminated C string as a label.
///
/// # Safety
///
/// `ptr` must be NULL or point to a NUL-terminated string that stays valid
/// and unmodified for the lifetime `'a`.
pub unsafe fn label<'a>(ptr: *const c_char) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(FfiError::NullPointer);
    }
    let raw = CStr::from_ptr(ptr);
    raw.to_str().map_err(|_| FfiError::InvalidUtf8 {
        lossy: raw.to_string_lossy().into_owned(),
    })
}

/// Render an argument for a trace call line: quoted text, or `NULL`.
///
/// # Safety
///
/// Same contract as [`label`].
pub unsafe fn display(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return "NULL".to_string();
    }
    format!("\"{}\"", CStr::from_ptr(ptr).to_string_lossy())
}
