//! C ABI for the poset engine.
//!
//! Exposes the functions declared in `include/poset.h` over one process-wide
//! [`PosetEngine`]. The engine itself is single-threaded; every call here
//! holds a single mutex for its whole duration.
//!
//! The trace starts disabled unless the `POSET_TRACE` environment variable is
//! set to `1`, `on` or `stderr` when the first call is made.
//!
//! ## Modules
//!
//! - [`marshal`] — C string → label conversion
//! - [`error`] — argument errors

pub mod error;
pub mod marshal;

use std::ffi::{c_char, c_int, c_ulong};
use std::sync::{Mutex, MutexGuard, OnceLock};

use poset_core::{EngineConfig, PosetEngine, PosetId, TraceMode};

use crate::error::FfiError;

static ENGINE: OnceLock<Mutex<PosetEngine>> = OnceLock::new();

fn initial_trace() -> TraceMode {
    match std::env::var("POSET_TRACE").as_deref() {
        Ok("1" | "on" | "stderr") => TraceMode::Stderr,
        _ => TraceMode::Off,
    }
}

fn engine() -> MutexGuard<'static, PosetEngine> {
    let lock = ENGINE.get_or_init(|| {
        Mutex::new(PosetEngine::new(
            EngineConfig::default().with_trace(initial_trace()),
        ))
    });
    // Operations either complete or panic before mutating, so a poisoned
    // engine is still consistent.
    lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn poset_id(id: c_ulong) -> PosetId {
    PosetId::new(u64::from(id))
}

/// Trace a call whose arguments could not be marshalled.
fn reject(engine: &mut PosetEngine, op: &str, id: c_ulong, args: &[String], err: &FfiError) {
    let trace = engine.trace_mut();
    trace.emit(|| format!("{op}({id}, {})", args.join(", ")));
    trace.emit(|| format!("{op}: {err}"));
}

/// Creates a new poset and returns its id.
#[no_mangle]
pub extern "C" fn poset_new() -> c_ulong {
    let id = engine().new_poset();
    id.get() as c_ulong
}

/// Adds `value` to poset `id`.
///
/// # Safety
///
/// `value` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn poset_insert(id: c_ulong, value: *const c_char) -> bool {
    let mut engine = engine();
    match marshal::label(value) {
        Ok(label) => engine.insert(poset_id(id), label),
        Err(err) => {
            reject(&mut engine, "poset_insert", id, &[marshal::display(value)], &err);
            false
        }
    }
}

/// Whether `value1` precedes `value2` in poset `id`.
///
/// # Safety
///
/// Both values must be NULL or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn poset_test(
    id: c_ulong,
    value1: *const c_char,
    value2: *const c_char,
) -> bool {
    with_pair("poset_test", id, value1, value2, |engine, poset, a, b| {
        engine.test(poset, a, b)
    })
}

/// Makes `value1` precede `value2` in poset `id`.
///
/// # Safety
///
/// Both values must be NULL or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn poset_add(
    id: c_ulong,
    value1: *const c_char,
    value2: *const c_char,
) -> bool {
    with_pair("poset_add", id, value1, value2, |engine, poset, a, b| {
        engine.add(poset, a, b)
    })
}

/// Number of elements of poset `id`, or 0 if it does not exist.
#[no_mangle]
pub extern "C" fn poset_size(id: c_ulong) -> usize {
    engine().size(poset_id(id))
}

/// Destroys poset `id`.
#[no_mangle]
pub extern "C" fn poset_delete(id: c_ulong) {
    engine().delete(poset_id(id));
}

/// Removes every element of poset `id`.
#[no_mangle]
pub extern "C" fn poset_clear(id: c_ulong) {
    engine().clear(poset_id(id));
}

/// Removes `value` from poset `id`.
///
/// # Safety
///
/// `value` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn poset_remove(id: c_ulong, value: *const c_char) -> bool {
    let mut engine = engine();
    match marshal::label(value) {
        Ok(label) => engine.remove(poset_id(id), label),
        Err(err) => {
            reject(&mut engine, "poset_remove", id, &[marshal::display(value)], &err);
            false
        }
    }
}

/// Retracts "`value1` precedes `value2`" in poset `id`.
///
/// # Safety
///
/// Both values must be NULL or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn poset_del(
    id: c_ulong,
    value1: *const c_char,
    value2: *const c_char,
) -> bool {
    with_pair("poset_del", id, value1, value2, |engine, poset, a, b| {
        engine.del(poset, a, b)
    })
}

/// Turns the stderr trace on (non-zero) or off (zero).
#[no_mangle]
pub extern "C" fn poset_set_trace(enabled: c_int) {
    let mode = if enabled != 0 {
        TraceMode::Stderr
    } else {
        TraceMode::Off
    };
    engine().trace_mut().set_mode(mode);
}

/// Marshal two labels, then run `op` under the engine lock.
///
/// # Safety
///
/// Both values must be NULL or valid NUL-terminated strings.
unsafe fn with_pair(
    name: &str,
    id: c_ulong,
    value1: *const c_char,
    value2: *const c_char,
    op: impl FnOnce(&mut PosetEngine, PosetId, &str, &str) -> bool,
) -> bool {
    let mut engine = engine();
    match (marshal::label(value1), marshal::label(value2)) {
        (Ok(a), Ok(b)) => op(&mut *engine, poset_id(id), a, b),
        (Err(err), _) | (_, Err(err)) => {
            let args = [marshal::display(value1), marshal::display(value2)];
            reject(&mut engine, name, id, &args, &err);
            false
        }
    }
}
