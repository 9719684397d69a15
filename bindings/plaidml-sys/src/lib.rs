// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 SpiralTorch Contributors
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Raw declarations of the PlaidML core C API.
//!
//! Every fallible entry point takes a `*mut plaidml_error` as its first
//! argument. On failure the engine sets a nonzero `code` and transfers
//! ownership of `msg` to the caller, who releases it with
//! [`plaidml_string_free`].
//!
//! By default the functions are served by an in-process [`stub`] engine with
//! identical signatures. Build with the `system` feature to resolve them
//! against the real engine library instead.
#![allow(non_camel_case_types)]

use std::ffi::c_int;

/// Error descriptor written by every fallible call.
#[repr(C)]
#[derive(Debug)]
pub struct plaidml_error {
    pub code: usize,
    pub msg: *mut plaidml_string,
}

impl plaidml_error {
    /// A descriptor in the success state, ready to be handed to the engine.
    pub const fn empty() -> Self {
        Self {
            code: 0,
            msg: std::ptr::null_mut(),
        }
    }
}

impl Default for plaidml_error {
    fn default() -> Self {
        Self::empty()
    }
}

/// Engine-owned string. Read with [`plaidml_string_ptr`], release with
/// [`plaidml_string_free`].
#[repr(C)]
pub struct plaidml_string {
    _private: [u8; 0],
}

#[repr(C)]
pub struct plaidml_shape {
    _private: [u8; 0],
}

#[repr(C)]
pub struct plaidml_buffer {
    _private: [u8; 0],
}

#[repr(C)]
pub struct plaidml_view {
    _private: [u8; 0],
}

/// Engine-owned array of integers, released with [`plaidml_integers_free`].
#[repr(C)]
#[derive(Debug)]
pub struct plaidml_integers {
    pub size: usize,
    pub elts: *mut i64,
}

pub type plaidml_datatype = c_int;

pub const PLAIDML_DATA_INVALID: plaidml_datatype = 0;
pub const PLAIDML_DATA_BOOLEAN: plaidml_datatype = 1;
pub const PLAIDML_DATA_INT8: plaidml_datatype = 2;
pub const PLAIDML_DATA_UINT8: plaidml_datatype = 3;
pub const PLAIDML_DATA_INT16: plaidml_datatype = 4;
pub const PLAIDML_DATA_UINT16: plaidml_datatype = 5;
pub const PLAIDML_DATA_INT32: plaidml_datatype = 6;
pub const PLAIDML_DATA_UINT32: plaidml_datatype = 7;
pub const PLAIDML_DATA_INT64: plaidml_datatype = 8;
pub const PLAIDML_DATA_UINT64: plaidml_datatype = 9;
pub const PLAIDML_DATA_BFLOAT16: plaidml_datatype = 10;
pub const PLAIDML_DATA_FLOAT16: plaidml_datatype = 11;
pub const PLAIDML_DATA_FLOAT32: plaidml_datatype = 12;
pub const PLAIDML_DATA_FLOAT64: plaidml_datatype = 13;

#[cfg(feature = "system")]
mod linked;
#[cfg(feature = "system")]
pub use linked::*;

#[cfg(not(feature = "system"))]
pub mod stub;
#[cfg(not(feature = "system"))]
pub use stub::{
    plaidml_buffer_alloc, plaidml_buffer_free, plaidml_buffer_mmap_current,
    plaidml_buffer_mmap_discard, plaidml_init, plaidml_integers_free, plaidml_settings_get,
    plaidml_settings_set, plaidml_shape_alloc, plaidml_shape_free, plaidml_shape_get_dtype,
    plaidml_shape_get_nbytes, plaidml_shape_get_ndims, plaidml_shape_get_sizes,
    plaidml_shape_get_strides, plaidml_shape_repr, plaidml_string_free, plaidml_string_ptr,
    plaidml_version, plaidml_view_data, plaidml_view_free, plaidml_view_size,
    plaidml_view_writeback,
};
