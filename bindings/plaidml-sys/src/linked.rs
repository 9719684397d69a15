// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 SpiralTorch Contributors
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::{
    plaidml_buffer, plaidml_datatype, plaidml_error, plaidml_integers, plaidml_shape,
    plaidml_string, plaidml_view,
};
use std::ffi::c_char;

extern "C" {
    pub fn plaidml_string_ptr(ptr: *mut plaidml_string) -> *const c_char;
    pub fn plaidml_string_free(ptr: *mut plaidml_string);

    pub fn plaidml_init(err: *mut plaidml_error);
    pub fn plaidml_version(err: *mut plaidml_error) -> *const c_char;

    pub fn plaidml_settings_get(err: *mut plaidml_error, key: *const c_char)
        -> *mut plaidml_string;
    pub fn plaidml_settings_set(err: *mut plaidml_error, key: *const c_char, value: *const c_char);

    pub fn plaidml_integers_free(err: *mut plaidml_error, ptr: *mut plaidml_integers);

    pub fn plaidml_shape_alloc(
        err: *mut plaidml_error,
        dtype: plaidml_datatype,
        rank: usize,
        sizes: *const i64,
        strides: *const i64,
    ) -> *mut plaidml_shape;
    pub fn plaidml_shape_free(err: *mut plaidml_error, ptr: *mut plaidml_shape);
    pub fn plaidml_shape_repr(err: *mut plaidml_error, ptr: *mut plaidml_shape)
        -> *mut plaidml_string;
    pub fn plaidml_shape_get_ndims(err: *mut plaidml_error, ptr: *mut plaidml_shape) -> usize;
    pub fn plaidml_shape_get_dtype(
        err: *mut plaidml_error,
        ptr: *mut plaidml_shape,
    ) -> plaidml_datatype;
    pub fn plaidml_shape_get_sizes(
        err: *mut plaidml_error,
        ptr: *mut plaidml_shape,
    ) -> *mut plaidml_integers;
    pub fn plaidml_shape_get_strides(
        err: *mut plaidml_error,
        ptr: *mut plaidml_shape,
    ) -> *mut plaidml_integers;
    pub fn plaidml_shape_get_nbytes(err: *mut plaidml_error, ptr: *mut plaidml_shape) -> u64;

    pub fn plaidml_buffer_alloc(
        err: *mut plaidml_error,
        device_id: *const c_char,
        size: usize,
    ) -> *mut plaidml_buffer;
    pub fn plaidml_buffer_free(err: *mut plaidml_error, ptr: *mut plaidml_buffer);
    pub fn plaidml_buffer_mmap_current(
        err: *mut plaidml_error,
        ptr: *mut plaidml_buffer,
    ) -> *mut plaidml_view;
    pub fn plaidml_buffer_mmap_discard(
        err: *mut plaidml_error,
        ptr: *mut plaidml_buffer,
    ) -> *mut plaidml_view;

    pub fn plaidml_view_free(err: *mut plaidml_error, ptr: *mut plaidml_view);
    pub fn plaidml_view_data(err: *mut plaidml_error, ptr: *mut plaidml_view) -> *mut c_char;
    pub fn plaidml_view_size(err: *mut plaidml_error, ptr: *mut plaidml_view) -> usize;
    pub fn plaidml_view_writeback(err: *mut plaidml_error, ptr: *mut plaidml_view);
}
