//! FFI bindings for Fatigue Check
//!
//! This module provides C-compatible functions for calling Fatigue Check from
//! other languages. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `fatigue_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::audit::{AuditStore, JsonlAuditStore, MemoryAuditStore, DEFAULT_HISTORY_LIMIT};
use crate::guidelines;
use crate::pipeline::{assess_json, FatigueProcessor};
use crate::types::FatigueLevel;
use crate::validation::validate_value;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Score a JSON input and return the JSON result.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `fatigue_free_string`.
/// - Returns NULL on error; call `fatigue_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fatigue_assess(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match assess_json(json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Validate a JSON input and return a JSON array of error messages.
///
/// An empty array (`[]`) means the input is valid.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `fatigue_free_string`.
/// - Returns NULL if `json` is not parseable JSON; call `fatigue_last_error`.
#[no_mangle]
pub unsafe extern "C" fn fatigue_validate(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&json_str) {
        Ok(v) => v,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let messages: Vec<String> = validate_value(&value).iter().map(|e| e.to_string()).collect();
    match serde_json::to_string(&messages) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Return the action guideline for a level name as JSON.
///
/// # Safety
/// - `level` must be a valid null-terminated C string (`Low`, `Moderate`, `High` or `Extreme`).
/// - Returns a newly allocated string that must be freed with `fatigue_free_string`.
/// - Returns NULL on error; call `fatigue_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fatigue_guideline(level: *const c_char) -> *mut c_char {
    clear_last_error();

    let level = match cstr_to_string(level).map(|s| s.parse::<FatigueLevel>()) {
        Some(Ok(level)) => level,
        Some(Err(e)) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
        None => {
            set_last_error("Invalid level string pointer");
            return ptr::null_mut();
        }
    };

    match serde_json::to_string(&guidelines::action_for(level)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a FatigueProcessor with an audit trail
pub struct FatigueProcessorHandle {
    processor: FatigueProcessor<Box<dyn AuditStore>>,
}

/// Create a processor that records every assessment.
///
/// # Safety
/// - `audit_path` must be NULL or a valid null-terminated C string. NULL keeps
///   the audit trail in memory; otherwise it is appended to that file.
/// - Returns a pointer that must be freed with `fatigue_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn fatigue_processor_new(audit_path: *const c_char) -> *mut FatigueProcessorHandle {
    clear_last_error();

    let store: Box<dyn AuditStore> = match cstr_to_string(audit_path) {
        Some(path) => Box::new(JsonlAuditStore::new(path)),
        None => Box::new(MemoryAuditStore::new()),
    };

    let handle = Box::new(FatigueProcessorHandle {
        processor: FatigueProcessor::new(store),
    });
    Box::into_raw(handle)
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `fatigue_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn fatigue_processor_free(processor: *mut FatigueProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Score and record a JSON input.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `fatigue_processor_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `fatigue_free_string`.
/// - Returns NULL on error; call `fatigue_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fatigue_processor_assess(
    processor: *mut FatigueProcessorHandle,
    json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.processor.process_json(&json_str) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Recorded assessments, newest first, as a JSON array.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `fatigue_processor_new`.
/// - `limit <= 0` uses the default of 100.
/// - Returns a newly allocated string that must be freed with `fatigue_free_string`.
/// - Returns NULL on error; call `fatigue_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn fatigue_processor_history(
    processor: *mut FatigueProcessorHandle,
    limit: i32,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;
    let limit = if limit <= 0 {
        DEFAULT_HISTORY_LIMIT
    } else {
        limit as usize
    };

    let history = handle
        .processor
        .history(limit)
        .and_then(|records| serde_json::to_string(&records).map_err(Into::into));

    match history {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Fatigue Check functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Fatigue Check function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn fatigue_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Fatigue Check call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn fatigue_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn fatigue_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
