// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 SpiralTorch Contributors
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! In-process stand-in for the PlaidML core engine.
//!
//! The stub serves host memory only and knows a single device,
//! [`STUB_DEVICE`]. It exists so the safe bindings can be built and tested on
//! machines without the engine installed. State (settings, counters, pending
//! failures) is kept per thread, which keeps parallel tests isolated; a handle
//! released on another thread is counted on that thread.
//!
//! Instrumentation:
//! - [`stats`] reports allocations and releases per handle kind.
//! - [`fail_next_call`] makes the next fallible, non-release call report an
//!   error with the given message.
//! - [`fail_next_release`] does the same for the next shape, buffer or view
//!   release; the refused handle stays allocated.
//! - [`reset`] restores counters and settings to their initial state.

use crate::{
    plaidml_buffer, plaidml_datatype, plaidml_error, plaidml_integers, plaidml_shape,
    plaidml_string, plaidml_view, PLAIDML_DATA_BFLOAT16, PLAIDML_DATA_BOOLEAN,
    PLAIDML_DATA_FLOAT16, PLAIDML_DATA_FLOAT32, PLAIDML_DATA_FLOAT64, PLAIDML_DATA_INT16,
    PLAIDML_DATA_INT32, PLAIDML_DATA_INT64, PLAIDML_DATA_INT8, PLAIDML_DATA_INVALID,
    PLAIDML_DATA_UINT16, PLAIDML_DATA_UINT32, PLAIDML_DATA_UINT64, PLAIDML_DATA_UINT8,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// The only device identifier the stub accepts.
pub const STUB_DEVICE: &str = "llvm_cpu.0";

/// Largest single allocation the stub serves before reporting out-of-memory.
pub const STUB_MEMORY_LIMIT: usize = 1 << 30;

static VERSION: &[u8] = concat!("stub-", env!("CARGO_PKG_VERSION"), "\0").as_bytes();

/// Allocation and release counts for one handle kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandleCounts {
    pub allocated: usize,
    pub released: usize,
}

impl HandleCounts {
    /// Handles handed out and not yet released.
    pub fn live(&self) -> usize {
        self.allocated.saturating_sub(self.released)
    }
}

/// Snapshot of the calling thread's stub counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StubStats {
    pub init_calls: usize,
    pub shapes: HandleCounts,
    pub buffers: HandleCounts,
    pub views: HandleCounts,
    pub strings: HandleCounts,
    pub integers: HandleCounts,
    pub writebacks: usize,
    pub failures: usize,
}

impl StubStats {
    /// Sum of live handles across every kind.
    pub fn live_handles(&self) -> usize {
        self.shapes.live()
            + self.buffers.live()
            + self.views.live()
            + self.strings.live()
            + self.integers.live()
    }
}

struct StubState {
    stats: StubStats,
    pending_failure: Option<String>,
    pending_release_failure: Option<String>,
    settings: BTreeMap<String, String>,
}

impl StubState {
    fn new() -> Self {
        Self {
            stats: StubStats::default(),
            pending_failure: None,
            pending_release_failure: None,
            settings: default_settings(),
        }
    }
}

fn default_settings() -> BTreeMap<String, String> {
    let mut settings = BTreeMap::new();
    settings.insert("PLAIDML_DEVICE".to_string(), STUB_DEVICE.to_string());
    settings.insert("PLAIDML_TARGET".to_string(), "llvm_cpu".to_string());
    settings.insert("PLAIDML_VERBOSE".to_string(), "0".to_string());
    settings
}

thread_local! {
    static STATE: RefCell<StubState> = RefCell::new(StubState::new());
}

fn with_state<R>(f: impl FnOnce(&mut StubState) -> R) -> R {
    STATE.with(|cell| f(&mut cell.borrow_mut()))
}

/// Returns the calling thread's counters.
pub fn stats() -> StubStats {
    with_state(|state| state.stats)
}

/// Clears counters, pending failures and settings for the calling thread.
pub fn reset() {
    with_state(|state| *state = StubState::new());
}

/// Arms a one-shot failure: the next fallible call (other than a release)
/// reports `message` through its error descriptor and produces nothing.
pub fn fail_next_call(message: impl Into<String>) {
    let message = message.into();
    with_state(|state| state.pending_failure = Some(message));
}

/// Arms a one-shot failure for the next shape, buffer or view release.
pub fn fail_next_release(message: impl Into<String>) {
    let message = message.into();
    with_state(|state| state.pending_release_failure = Some(message));
}

struct StubShape {
    dtype: plaidml_datatype,
    sizes: Vec<i64>,
    strides: Vec<i64>,
}

struct StubBuffer {
    device: String,
    data: Arc<Mutex<Vec<u8>>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MapMode {
    Current,
    Discard,
}

struct StubView {
    mode: MapMode,
    target: Arc<Mutex<Vec<u8>>>,
    staging: Vec<u8>,
    data: *mut u8,
    len: usize,
}

fn element_size(dtype: plaidml_datatype) -> Option<u64> {
    let size = match dtype {
        PLAIDML_DATA_INVALID => 0,
        PLAIDML_DATA_BOOLEAN | PLAIDML_DATA_INT8 | PLAIDML_DATA_UINT8 => 1,
        PLAIDML_DATA_INT16 | PLAIDML_DATA_UINT16 => 2,
        PLAIDML_DATA_BFLOAT16 | PLAIDML_DATA_FLOAT16 => 2,
        PLAIDML_DATA_INT32 | PLAIDML_DATA_UINT32 | PLAIDML_DATA_FLOAT32 => 4,
        PLAIDML_DATA_INT64 | PLAIDML_DATA_UINT64 | PLAIDML_DATA_FLOAT64 => 8,
        _ => return None,
    };
    Some(size)
}

fn dtype_name(dtype: plaidml_datatype) -> &'static str {
    match dtype {
        PLAIDML_DATA_BOOLEAN => "bool",
        PLAIDML_DATA_INT8 => "i8",
        PLAIDML_DATA_UINT8 => "u8",
        PLAIDML_DATA_INT16 => "i16",
        PLAIDML_DATA_UINT16 => "u16",
        PLAIDML_DATA_INT32 => "i32",
        PLAIDML_DATA_UINT32 => "u32",
        PLAIDML_DATA_INT64 => "i64",
        PLAIDML_DATA_UINT64 => "u64",
        PLAIDML_DATA_BFLOAT16 => "bf16",
        PLAIDML_DATA_FLOAT16 => "f16",
        PLAIDML_DATA_FLOAT32 => "f32",
        PLAIDML_DATA_FLOAT64 => "f64",
        _ => "invalid",
    }
}

impl StubShape {
    /// Bytes spanned by the layout: the furthest reachable element plus one.
    /// `None` when the extent does not fit in a `u64`.
    fn checked_nbytes(&self) -> Option<u64> {
        let elem = element_size(self.dtype).unwrap_or(0);
        if elem == 0 || self.sizes.iter().any(|&size| size == 0) {
            return Some(0);
        }
        let mut extent = 1u64;
        for (&size, &stride) in self.sizes.iter().zip(&self.strides) {
            let span = (size as u64 - 1).checked_mul(stride.unsigned_abs())?;
            extent = extent.checked_add(span)?;
        }
        extent.checked_mul(elem)
    }

    fn nbytes(&self) -> u64 {
        self.checked_nbytes().unwrap_or(u64::MAX)
    }

    fn repr(&self) -> String {
        let join = |values: &[i64]| {
            values
                .iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "{}({}):({}):{} bytes",
            dtype_name(self.dtype),
            join(&self.sizes),
            join(&self.strides),
            self.nbytes()
        )
    }
}

unsafe fn begin(err: *mut plaidml_error) {
    if !err.is_null() {
        *err = plaidml_error::empty();
    }
}

fn new_string(text: &str) -> *mut plaidml_string {
    let owned = CString::new(text.replace('\0', "\\0")).unwrap_or_default();
    with_state(|state| state.stats.strings.allocated += 1);
    Box::into_raw(Box::new(owned)) as *mut plaidml_string
}

unsafe fn report(err: *mut plaidml_error, message: &str) {
    trace!(target: "plaidml_sys::stub", reason = message, "stub call failed");
    with_state(|state| state.stats.failures += 1);
    if !err.is_null() {
        (*err).code = 1;
        (*err).msg = new_string(message);
    }
}

/// Starts a fallible call: clears the descriptor and fires any armed failure.
/// Returns `false` when the call must bail out.
unsafe fn enter(err: *mut plaidml_error) -> bool {
    begin(err);
    if let Some(message) = with_state(|state| state.pending_failure.take()) {
        report(err, &message);
        return false;
    }
    true
}

/// Starts a release: clears the descriptor and fires any armed release
/// failure. Returns `false` when the handle must be kept.
unsafe fn enter_release(err: *mut plaidml_error) -> bool {
    begin(err);
    if let Some(message) = with_state(|state| state.pending_release_failure.take()) {
        report(err, &message);
        return false;
    }
    true
}

unsafe fn c_str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

fn new_integers(values: &[i64]) -> *mut plaidml_integers {
    let boxed: Box<[i64]> = values.to_vec().into_boxed_slice();
    let size = boxed.len();
    let elts = Box::into_raw(boxed) as *mut i64;
    with_state(|state| state.stats.integers.allocated += 1);
    Box::into_raw(Box::new(plaidml_integers { size, elts }))
}

pub unsafe extern "C" fn plaidml_string_ptr(ptr: *mut plaidml_string) -> *const c_char {
    if ptr.is_null() {
        return ptr::null();
    }
    (*(ptr as *mut CString)).as_ptr()
}

pub unsafe extern "C" fn plaidml_string_free(ptr: *mut plaidml_string) {
    if ptr.is_null() {
        return;
    }
    drop(Box::from_raw(ptr as *mut CString));
    with_state(|state| state.stats.strings.released += 1);
}

pub unsafe extern "C" fn plaidml_init(err: *mut plaidml_error) {
    if !enter(err) {
        return;
    }
    with_state(|state| state.stats.init_calls += 1);
}

pub unsafe extern "C" fn plaidml_version(err: *mut plaidml_error) -> *const c_char {
    if !enter(err) {
        return ptr::null();
    }
    VERSION.as_ptr() as *const c_char
}

pub unsafe extern "C" fn plaidml_settings_get(
    err: *mut plaidml_error,
    key: *const c_char,
) -> *mut plaidml_string {
    if !enter(err) {
        return ptr::null_mut();
    }
    let Some(key) = c_str_arg(key) else {
        report(err, "Setting key must be valid UTF-8");
        return ptr::null_mut();
    };
    match with_state(|state| state.settings.get(key).cloned()) {
        Some(value) => new_string(&value),
        None => {
            report(err, &format!("Unknown setting: {key}"));
            ptr::null_mut()
        }
    }
}

pub unsafe extern "C" fn plaidml_settings_set(
    err: *mut plaidml_error,
    key: *const c_char,
    value: *const c_char,
) {
    if !enter(err) {
        return;
    }
    let (Some(key), Some(value)) = (c_str_arg(key), c_str_arg(value)) else {
        report(err, "Setting key and value must be valid UTF-8");
        return;
    };
    if key.is_empty() {
        report(err, "Setting key must not be empty");
        return;
    }
    with_state(|state| {
        state.settings.insert(key.to_string(), value.to_string());
    });
}

pub unsafe extern "C" fn plaidml_integers_free(err: *mut plaidml_error, ptr: *mut plaidml_integers) {
    begin(err);
    if ptr.is_null() {
        return;
    }
    let ints = Box::from_raw(ptr);
    if !ints.elts.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ints.elts, ints.size)));
    }
    with_state(|state| state.stats.integers.released += 1);
}

pub unsafe extern "C" fn plaidml_shape_alloc(
    err: *mut plaidml_error,
    dtype: plaidml_datatype,
    rank: usize,
    sizes: *const i64,
    strides: *const i64,
) -> *mut plaidml_shape {
    if !enter(err) {
        return ptr::null_mut();
    }
    if element_size(dtype).is_none() {
        report(err, &format!("Unsupported data type: {dtype}"));
        return ptr::null_mut();
    }
    if rank > 0 && dtype == PLAIDML_DATA_INVALID {
        report(err, &format!("Invalid data type for a shape of rank {rank}"));
        return ptr::null_mut();
    }
    if rank > 0 && (sizes.is_null() || strides.is_null()) {
        report(err, &format!("Sizes and strides are required for rank {rank}"));
        return ptr::null_mut();
    }
    let (sizes, strides) = if rank == 0 {
        (Vec::new(), Vec::new())
    } else {
        (
            std::slice::from_raw_parts(sizes, rank).to_vec(),
            std::slice::from_raw_parts(strides, rank).to_vec(),
        )
    };
    if let Some(size) = sizes.iter().find(|&&size| size < 0) {
        report(err, &format!("Negative dimension size: {size}"));
        return ptr::null_mut();
    }
    let shape = StubShape {
        dtype,
        sizes,
        strides,
    };
    if shape.checked_nbytes().is_none() {
        report(err, "Shape too large");
        return ptr::null_mut();
    }
    with_state(|state| state.stats.shapes.allocated += 1);
    Box::into_raw(Box::new(shape)) as *mut plaidml_shape
}

pub unsafe extern "C" fn plaidml_shape_free(err: *mut plaidml_error, ptr: *mut plaidml_shape) {
    if ptr.is_null() {
        begin(err);
        return;
    }
    if !enter_release(err) {
        return;
    }
    drop(Box::from_raw(ptr as *mut StubShape));
    with_state(|state| state.stats.shapes.released += 1);
}

unsafe fn shape_ref<'a>(err: *mut plaidml_error, ptr: *mut plaidml_shape) -> Option<&'a StubShape> {
    if !enter(err) {
        return None;
    }
    if ptr.is_null() {
        report(err, "Shape handle is null");
        return None;
    }
    Some(&*(ptr as *const StubShape))
}

pub unsafe extern "C" fn plaidml_shape_repr(
    err: *mut plaidml_error,
    ptr: *mut plaidml_shape,
) -> *mut plaidml_string {
    match shape_ref(err, ptr) {
        Some(shape) => new_string(&shape.repr()),
        None => ptr::null_mut(),
    }
}

pub unsafe extern "C" fn plaidml_shape_get_ndims(
    err: *mut plaidml_error,
    ptr: *mut plaidml_shape,
) -> usize {
    shape_ref(err, ptr).map(|shape| shape.sizes.len()).unwrap_or(0)
}

pub unsafe extern "C" fn plaidml_shape_get_dtype(
    err: *mut plaidml_error,
    ptr: *mut plaidml_shape,
) -> plaidml_datatype {
    shape_ref(err, ptr)
        .map(|shape| shape.dtype)
        .unwrap_or(PLAIDML_DATA_INVALID)
}

pub unsafe extern "C" fn plaidml_shape_get_sizes(
    err: *mut plaidml_error,
    ptr: *mut plaidml_shape,
) -> *mut plaidml_integers {
    match shape_ref(err, ptr) {
        Some(shape) => new_integers(&shape.sizes),
        None => ptr::null_mut(),
    }
}

pub unsafe extern "C" fn plaidml_shape_get_strides(
    err: *mut plaidml_error,
    ptr: *mut plaidml_shape,
) -> *mut plaidml_integers {
    match shape_ref(err, ptr) {
        Some(shape) => new_integers(&shape.strides),
        None => ptr::null_mut(),
    }
}

pub unsafe extern "C" fn plaidml_shape_get_nbytes(
    err: *mut plaidml_error,
    ptr: *mut plaidml_shape,
) -> u64 {
    shape_ref(err, ptr).map(StubShape::nbytes).unwrap_or(0)
}

pub unsafe extern "C" fn plaidml_buffer_alloc(
    err: *mut plaidml_error,
    device_id: *const c_char,
    size: usize,
) -> *mut plaidml_buffer {
    if !enter(err) {
        return ptr::null_mut();
    }
    let Some(device) = c_str_arg(device_id) else {
        report(err, "Device identifier must be valid UTF-8");
        return ptr::null_mut();
    };
    if device != STUB_DEVICE {
        report(err, &format!("Unknown device: {device}"));
        return ptr::null_mut();
    }
    if size > STUB_MEMORY_LIMIT {
        report(
            err,
            &format!("Out of memory: requested {size} bytes on {device}"),
        );
        return ptr::null_mut();
    }
    with_state(|state| state.stats.buffers.allocated += 1);
    Box::into_raw(Box::new(StubBuffer {
        device: device.to_string(),
        data: Arc::new(Mutex::new(vec![0u8; size])),
    })) as *mut plaidml_buffer
}

pub unsafe extern "C" fn plaidml_buffer_free(err: *mut plaidml_error, ptr: *mut plaidml_buffer) {
    if ptr.is_null() {
        begin(err);
        return;
    }
    if !enter_release(err) {
        return;
    }
    let buffer = Box::from_raw(ptr as *mut StubBuffer);
    trace!(target: "plaidml_sys::stub", device = %buffer.device, "buffer released");
    drop(buffer);
    with_state(|state| state.stats.buffers.released += 1);
}

unsafe fn map_buffer(
    err: *mut plaidml_error,
    ptr: *mut plaidml_buffer,
    mode: MapMode,
) -> *mut plaidml_view {
    if !enter(err) {
        return ptr::null_mut();
    }
    if ptr.is_null() {
        report(err, "Buffer handle is null");
        return ptr::null_mut();
    }
    let buffer = &*(ptr as *const StubBuffer);
    let target = Arc::clone(&buffer.data);
    let (current, len) = {
        let mut guard = lock(&target);
        (guard.as_mut_ptr(), guard.len())
    };
    let mut staging = match mode {
        MapMode::Current => Vec::new(),
        MapMode::Discard => vec![0u8; len],
    };
    let data = match mode {
        MapMode::Current => current,
        MapMode::Discard => staging.as_mut_ptr(),
    };
    with_state(|state| state.stats.views.allocated += 1);
    Box::into_raw(Box::new(StubView {
        mode,
        target,
        staging,
        data,
        len,
    })) as *mut plaidml_view
}

fn lock(data: &Mutex<Vec<u8>>) -> std::sync::MutexGuard<'_, Vec<u8>> {
    match data.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub unsafe extern "C" fn plaidml_buffer_mmap_current(
    err: *mut plaidml_error,
    ptr: *mut plaidml_buffer,
) -> *mut plaidml_view {
    map_buffer(err, ptr, MapMode::Current)
}

pub unsafe extern "C" fn plaidml_buffer_mmap_discard(
    err: *mut plaidml_error,
    ptr: *mut plaidml_buffer,
) -> *mut plaidml_view {
    map_buffer(err, ptr, MapMode::Discard)
}

pub unsafe extern "C" fn plaidml_view_free(err: *mut plaidml_error, ptr: *mut plaidml_view) {
    if ptr.is_null() {
        begin(err);
        return;
    }
    if !enter_release(err) {
        return;
    }
    drop(Box::from_raw(ptr as *mut StubView));
    with_state(|state| state.stats.views.released += 1);
}

unsafe fn view_mut<'a>(err: *mut plaidml_error, ptr: *mut plaidml_view) -> Option<&'a mut StubView> {
    if !enter(err) {
        return None;
    }
    if ptr.is_null() {
        report(err, "View handle is null");
        return None;
    }
    Some(&mut *(ptr as *mut StubView))
}

pub unsafe extern "C" fn plaidml_view_data(
    err: *mut plaidml_error,
    ptr: *mut plaidml_view,
) -> *mut c_char {
    view_mut(err, ptr)
        .map(|view| view.data as *mut c_char)
        .unwrap_or(ptr::null_mut())
}

pub unsafe extern "C" fn plaidml_view_size(err: *mut plaidml_error, ptr: *mut plaidml_view) -> usize {
    view_mut(err, ptr).map(|view| view.len).unwrap_or(0)
}

/// Discard views publish their staging bytes; current views already alias the
/// buffer, so writing them back is a no-op.
pub unsafe extern "C" fn plaidml_view_writeback(err: *mut plaidml_error, ptr: *mut plaidml_view) {
    let Some(view) = view_mut(err, ptr) else {
        return;
    };
    if view.mode == MapMode::Discard {
        lock(&view.target).copy_from_slice(&view.staging);
    }
    with_state(|state| state.stats.writebacks += 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take_message(err: &plaidml_error) -> String {
        let text = CStr::from_ptr(plaidml_string_ptr(err.msg))
            .to_string_lossy()
            .into_owned();
        plaidml_string_free(err.msg);
        text
    }

    #[test]
    fn injected_failure_fires_once() {
        reset();
        fail_next_call("boom");
        let mut err = plaidml_error::empty();
        unsafe {
            plaidml_init(&mut err);
            assert_eq!(err.code, 1);
            assert_eq!(take_message(&err), "boom");
            plaidml_init(&mut err);
        }
        assert_eq!(err.code, 0);
        let stats = stats();
        assert_eq!(stats.init_calls, 1);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.live_handles(), 0);
    }

    #[test]
    fn refused_release_keeps_the_handle() {
        reset();
        let mut err = plaidml_error::empty();
        let shape = unsafe {
            plaidml_shape_alloc(&mut err, PLAIDML_DATA_INVALID, 0, ptr::null(), ptr::null())
        };
        fail_next_release("shape pinned");
        unsafe {
            plaidml_shape_free(&mut err, shape);
            assert_eq!(take_message(&err), "shape pinned");
            assert_eq!(stats().shapes.live(), 1);
            plaidml_shape_free(&mut err, shape);
        }
        assert_eq!(err.code, 0);
        assert_eq!(stats().shapes.released, 1);
    }

    #[test]
    fn strided_extent_counts_furthest_element() {
        let shape = StubShape {
            dtype: PLAIDML_DATA_FLOAT32,
            sizes: vec![2, 3],
            strides: vec![1, 2],
        };
        assert_eq!(shape.nbytes(), 6 * 4);
        let broadcast = StubShape {
            dtype: PLAIDML_DATA_INT8,
            sizes: vec![4, 3],
            strides: vec![0, 1],
        };
        assert_eq!(broadcast.nbytes(), 3);
    }

    #[test]
    fn oversized_extent_is_rejected_at_allocation() {
        reset();
        let sizes = [1i64 << 33, 1 << 33];
        let strides = [1i64 << 33, 1];
        let mut err = plaidml_error::empty();
        let shape = unsafe {
            plaidml_shape_alloc(
                &mut err,
                PLAIDML_DATA_INT8,
                2,
                sizes.as_ptr(),
                strides.as_ptr(),
            )
        };
        assert!(shape.is_null());
        assert_eq!(unsafe { take_message(&err) }, "Shape too large");
        assert_eq!(stats().shapes.allocated, 0);

        let huge = StubShape {
            dtype: PLAIDML_DATA_FLOAT64,
            sizes: vec![i64::MAX],
            strides: vec![1],
        };
        assert_eq!(huge.checked_nbytes(), None);
    }

    #[test]
    fn discard_view_is_invisible_until_writeback() {
        reset();
        let device = CString::new(STUB_DEVICE).unwrap();
        let mut err = plaidml_error::empty();
        unsafe {
            let buffer = plaidml_buffer_alloc(&mut err, device.as_ptr(), 4);
            let view = plaidml_buffer_mmap_discard(&mut err, buffer);
            let data = plaidml_view_data(&mut err, view) as *mut u8;
            std::ptr::write_bytes(data, 7, 4);

            let current = plaidml_buffer_mmap_current(&mut err, buffer);
            let seen = plaidml_view_data(&mut err, current) as *const u8;
            assert_eq!(std::slice::from_raw_parts(seen, 4).to_vec(), vec![0, 0, 0, 0]);

            plaidml_view_writeback(&mut err, view);
            assert_eq!(std::slice::from_raw_parts(seen, 4).to_vec(), vec![7, 7, 7, 7]);

            plaidml_view_free(&mut err, current);
            plaidml_view_free(&mut err, view);
            plaidml_buffer_free(&mut err, buffer);
        }
        assert_eq!(err.code, 0);
        assert_eq!(stats().live_handles(), 0);
    }

    #[test]
    fn unknown_device_is_reported() {
        reset();
        let device = CString::new("cuda.7").unwrap();
        let mut err = plaidml_error::empty();
        let buffer = unsafe { plaidml_buffer_alloc(&mut err, device.as_ptr(), 16) };
        assert!(buffer.is_null());
        assert_eq!(unsafe { take_message(&err) }, "Unknown device: cuda.7");
        assert_eq!(stats().buffers.allocated, 0);
    }
}
