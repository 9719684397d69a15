// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Adapters between the engine's calling convention and `CoreResult`.
//!
//! Every engine call goes through [`call`]: it hands the engine a fresh error
//! descriptor and turns a nonzero code into [`CoreError::Engine`], taking
//! ownership of the message on the way. Engine-owned strings and integer
//! arrays are copied out and released immediately by [`take_string`] and
//! [`call_integers`].

use crate::error::{CoreError, CoreResult};
use plaidml_sys as sys;
use std::ffi::{CStr, CString};
use tracing::{debug, trace};

pub(crate) fn call<T>(f: impl FnOnce(*mut sys::plaidml_error) -> T) -> CoreResult<T> {
    let mut err = sys::plaidml_error::empty();
    let ret = f(&mut err as *mut sys::plaidml_error);
    if err.code != 0 {
        let message = if err.msg.is_null() {
            format!("engine error {}", err.code)
        } else {
            // SAFETY: the engine transferred ownership of `msg` with the error.
            unsafe { take_string(err.msg) }
        };
        debug!(code = err.code, reason = %message, "engine call failed");
        return Err(CoreError::Engine(message));
    }
    trace!("engine call succeeded");
    Ok(ret)
}

/// Copies an engine-owned string and releases it.
///
/// # Safety
/// `ptr` must be null or a live string handle owned by the caller; it is
/// released before returning and must not be used afterwards.
pub(crate) unsafe fn take_string(ptr: *mut sys::plaidml_string) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let raw = sys::plaidml_string_ptr(ptr);
    let text = if raw.is_null() {
        String::new()
    } else {
        CStr::from_ptr(raw).to_string_lossy().into_owned()
    };
    sys::plaidml_string_free(ptr);
    text
}

/// Runs a string-producing call and returns the copied text.
pub(crate) fn call_string(
    f: impl FnOnce(*mut sys::plaidml_error) -> *mut sys::plaidml_string,
) -> CoreResult<String> {
    let ptr = call(f)?;
    if ptr.is_null() {
        return Err(CoreError::NullHandle("string"));
    }
    // SAFETY: non-null and freshly handed over by the engine.
    Ok(unsafe { take_string(ptr) })
}

/// Runs an integer-array-producing call, copies the values and releases the array.
pub(crate) fn call_integers(
    f: impl FnOnce(*mut sys::plaidml_error) -> *mut sys::plaidml_integers,
) -> CoreResult<Vec<i64>> {
    let ptr = call(f)?;
    if ptr.is_null() {
        return Err(CoreError::NullHandle("integers"));
    }
    // SAFETY: non-null and owned by us until `plaidml_integers_free`.
    let values = unsafe {
        let ints = &*ptr;
        if ints.size == 0 || ints.elts.is_null() {
            Vec::new()
        } else {
            std::slice::from_raw_parts(ints.elts, ints.size).to_vec()
        }
    };
    call(|err| unsafe { sys::plaidml_integers_free(err, ptr) })?;
    Ok(values)
}

pub(crate) fn c_string(text: &str) -> CoreResult<CString> {
    Ok(CString::new(text)?)
}
