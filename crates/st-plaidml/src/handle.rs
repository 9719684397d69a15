// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Shared ownership of engine handles.
//!
//! A [`Handle`] owns one raw engine pointer behind an `Arc`. Clones share the
//! pointer; the engine's release function runs once, when the last clone is
//! dropped.

use crate::error::{CoreError, CoreResult};
use crate::ffi;
use plaidml_sys as sys;
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;
use tracing::{debug, warn};

/// Engine object kinds that are released through a `*_free` entry point.
pub trait Release {
    const KIND: &'static str;

    /// # Safety
    /// `ptr` must be a live handle of this kind; it is invalid afterwards.
    unsafe fn release(err: *mut sys::plaidml_error, ptr: *mut Self);
}

impl Release for sys::plaidml_shape {
    const KIND: &'static str = "shape";

    unsafe fn release(err: *mut sys::plaidml_error, ptr: *mut Self) {
        sys::plaidml_shape_free(err, ptr)
    }
}

impl Release for sys::plaidml_buffer {
    const KIND: &'static str = "buffer";

    unsafe fn release(err: *mut sys::plaidml_error, ptr: *mut Self) {
        sys::plaidml_buffer_free(err, ptr)
    }
}

impl Release for sys::plaidml_view {
    const KIND: &'static str = "view";

    unsafe fn release(err: *mut sys::plaidml_error, ptr: *mut Self) {
        sys::plaidml_view_free(err, ptr)
    }
}

struct Owned<T: Release> {
    ptr: NonNull<T>,
}

// SAFETY: the engine API accepts handles from any thread. This layer adds no
// synchronisation; concurrent use of one handle is governed by the engine.
unsafe impl<T: Release> Send for Owned<T> {}
unsafe impl<T: Release> Sync for Owned<T> {}

impl<T: Release> Drop for Owned<T> {
    fn drop(&mut self) {
        let ptr = self.ptr.as_ptr();
        // Release failures have nowhere to go from `drop`.
        match ffi::call(|err| unsafe { T::release(err, ptr) }) {
            Ok(()) => debug!(kind = T::KIND, ?ptr, "released engine handle"),
            Err(err) => warn!(kind = T::KIND, ?ptr, %err, "engine failed to release handle"),
        }
    }
}

/// Reference-counted owner of one engine handle.
pub struct Handle<T: Release> {
    inner: Arc<Owned<T>>,
}

impl<T: Release> Handle<T> {
    /// Adopts a raw handle. The returned value (and its clones) release it.
    ///
    /// # Safety
    /// `ptr` must be a live handle of kind `T` that nothing else will release.
    pub unsafe fn from_raw(ptr: *mut T) -> CoreResult<Self> {
        let ptr = NonNull::new(ptr).ok_or(CoreError::NullHandle(T::KIND))?;
        debug!(kind = T::KIND, ptr = ?ptr.as_ptr(), "adopted engine handle");
        Ok(Self {
            inner: Arc::new(Owned { ptr }),
        })
    }

    /// The raw pointer, valid for as long as any clone of this handle lives.
    pub fn as_ptr(&self) -> *mut T {
        self.inner.ptr.as_ptr()
    }

    /// Number of wrappers currently sharing the underlying handle.
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether both wrappers share one underlying handle.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Release> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Release> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &T::KIND)
            .field("ptr", &self.as_ptr())
            .field("shares", &self.share_count())
            .finish()
    }
}
