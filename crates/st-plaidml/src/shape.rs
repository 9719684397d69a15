// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Tensor shapes backed by engine shape handles.

use crate::dtype::DType;
use crate::error::{CoreError, CoreResult};
use crate::ffi;
use crate::handle::Handle;
use plaidml_sys as sys;
use std::fmt;

/// Row-major strides, in elements, for a dense tensor with `sizes`.
pub fn dense_strides(sizes: &[i64]) -> Vec<i64> {
    let mut strides = vec![1i64; sizes.len()];
    for i in (0..sizes.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1].saturating_mul(sizes[i + 1]);
    }
    strides
}

/// Element type, per-dimension sizes and strides, and byte footprint of a
/// tensor.
///
/// Clones share one engine handle. Two shapes compare equal when the engine
/// renders them to the same text; no field-wise comparison takes place.
///
/// `TensorShape::default()` is the invalid shape. It is answered locally
/// until its text is requested, so creating one never fails.
#[derive(Clone, Default)]
pub struct TensorShape {
    handle: Option<Handle<sys::plaidml_shape>>,
}

impl TensorShape {
    /// Dense row-major shape.
    pub fn new(dtype: DType, sizes: &[i64]) -> CoreResult<Self> {
        let strides = dense_strides(sizes);
        Self::alloc(dtype, sizes, &strides)
    }

    /// Shape with caller-chosen strides; transposed, broadcast and padded
    /// layouts are passed through to the engine as given.
    pub fn with_strides(dtype: DType, sizes: &[i64], strides: &[i64]) -> CoreResult<Self> {
        if sizes.len() != strides.len() {
            return Err(CoreError::RankMismatch {
                sizes: sizes.len(),
                strides: strides.len(),
            });
        }
        Self::alloc(dtype, sizes, strides)
    }

    /// Wraps a shape handle; the new value shares ownership with `handle`.
    pub fn from_handle(handle: Handle<sys::plaidml_shape>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Adopts a raw shape handle produced by the engine.
    ///
    /// # Safety
    /// `ptr` must be a live shape handle that nothing else will release.
    pub unsafe fn from_raw(ptr: *mut sys::plaidml_shape) -> CoreResult<Self> {
        Ok(Self::from_handle(Handle::from_raw(ptr)?))
    }

    fn alloc(dtype: DType, sizes: &[i64], strides: &[i64]) -> CoreResult<Self> {
        let ptr = ffi::call(|err| unsafe {
            sys::plaidml_shape_alloc(
                err,
                dtype.as_raw(),
                sizes.len(),
                sizes.as_ptr(),
                strides.as_ptr(),
            )
        })?;
        // SAFETY: freshly allocated by the engine and owned by nobody else.
        unsafe { Self::from_raw(ptr) }
    }

    /// The engine handle, or `None` for a default shape that never reached
    /// the engine.
    pub fn handle(&self) -> Option<&Handle<sys::plaidml_shape>> {
        self.handle.as_ref()
    }

    /// Raw pointer for passing to other engine calls; null for a default shape.
    pub fn as_ptr(&self) -> *mut sys::plaidml_shape {
        self.handle
            .as_ref()
            .map_or(std::ptr::null_mut(), Handle::as_ptr)
    }

    pub fn dtype(&self) -> CoreResult<DType> {
        match self.raw() {
            None => Ok(DType::Invalid),
            Some(ptr) => {
                let code = ffi::call(|err| unsafe { sys::plaidml_shape_get_dtype(err, ptr) })?;
                DType::from_raw(code)
            }
        }
    }

    pub fn ndims(&self) -> CoreResult<usize> {
        match self.raw() {
            None => Ok(0),
            Some(ptr) => ffi::call(|err| unsafe { sys::plaidml_shape_get_ndims(err, ptr) }),
        }
    }

    /// Total byte footprint as reported by the engine.
    pub fn nbytes(&self) -> CoreResult<u64> {
        match self.raw() {
            None => Ok(0),
            Some(ptr) => ffi::call(|err| unsafe { sys::plaidml_shape_get_nbytes(err, ptr) }),
        }
    }

    pub fn sizes(&self) -> CoreResult<Vec<i64>> {
        match self.raw() {
            None => Ok(Vec::new()),
            Some(ptr) => ffi::call_integers(|err| unsafe { sys::plaidml_shape_get_sizes(err, ptr) }),
        }
    }

    pub fn strides(&self) -> CoreResult<Vec<i64>> {
        match self.raw() {
            None => Ok(Vec::new()),
            Some(ptr) => {
                ffi::call_integers(|err| unsafe { sys::plaidml_shape_get_strides(err, ptr) })
            }
        }
    }

    /// The engine's textual rendering of this shape.
    pub fn repr(&self) -> CoreResult<String> {
        match self.raw() {
            Some(ptr) => ffi::call_string(|err| unsafe { sys::plaidml_shape_repr(err, ptr) }),
            // The invalid shape's text belongs to the engine too.
            None => Self::alloc(DType::Invalid, &[], &[])?.repr(),
        }
    }

    fn raw(&self) -> Option<*mut sys::plaidml_shape> {
        self.handle.as_ref().map(Handle::as_ptr)
    }
}

/// Compares engine text. Wrappers sharing one handle are equal without asking
/// the engine; otherwise a shape whose text cannot be produced is unequal to
/// everything else.
impl PartialEq for TensorShape {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(lhs), Some(rhs)) = (&self.handle, &other.handle) {
            if lhs.ptr_eq(rhs) {
                return true;
            }
        }
        match (self.repr(), other.repr()) {
            (Ok(lhs), Ok(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr() {
            Ok(text) => f.write_str(&text),
            Err(err) => write!(f, "<shape unavailable: {err}>"),
        }
    }
}

impl fmt::Debug for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TensorShape")
            .field(&format_args!("{self}"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_strides_are_row_major() {
        assert_eq!(dense_strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(dense_strides(&[5]), vec![1]);
        assert_eq!(dense_strides(&[]), Vec::<i64>::new());
        assert_eq!(dense_strides(&[7, 0, 3]), vec![0, 3, 1]);
    }

    #[test]
    fn dense_strides_hold_the_recurrence() {
        let sizes = [3, 1, 4, 1, 5, 9, 2, 6];
        let strides = dense_strides(&sizes);
        assert_eq!(strides[sizes.len() - 1], 1);
        for i in 0..sizes.len() - 1 {
            assert_eq!(strides[i], strides[i + 1] * sizes[i + 1]);
        }
    }

    #[test]
    fn rank_mismatch_is_a_local_failure() {
        let err = TensorShape::with_strides(DType::Float32, &[2, 3], &[1]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::RankMismatch {
                sizes: 2,
                strides: 1
            }
        ));
        assert_eq!(err.to_string(), "Sizes and strides must have the same rank.");
    }

    #[test]
    fn default_shape_is_answered_locally() {
        let shape = TensorShape::default();
        assert!(shape.handle().is_none());
        assert!(shape.as_ptr().is_null());
        assert_eq!(shape.dtype().unwrap(), DType::Invalid);
        assert_eq!(shape.ndims().unwrap(), 0);
        assert_eq!(shape.nbytes().unwrap(), 0);
    }
}

#[cfg(all(test, not(feature = "system")))]
mod stub_tests {
    use super::*;
    use plaidml_sys::stub;

    #[test]
    fn dense_shape_reports_engine_fields() {
        stub::reset();
        let shape = TensorShape::new(DType::Float32, &[2, 3, 4]).unwrap();
        assert_eq!(shape.dtype().unwrap(), DType::Float32);
        assert_eq!(shape.ndims().unwrap(), 3);
        assert_eq!(shape.sizes().unwrap(), vec![2, 3, 4]);
        assert_eq!(shape.strides().unwrap(), vec![12, 4, 1]);
        assert_eq!(shape.nbytes().unwrap(), 96);
        assert_eq!(stub::stats().integers.live(), 0);
    }

    #[test]
    fn rank_mismatch_never_reaches_the_engine() {
        stub::reset();
        assert!(TensorShape::with_strides(DType::Int8, &[1, 2, 3], &[6, 3]).is_err());
        let stats = stub::stats();
        assert_eq!(stats.shapes.allocated, 0);
        assert_eq!(stats.failures, 0);
    }

    #[test]
    fn equality_follows_the_text() {
        stub::reset();
        let a = TensorShape::new(DType::Float16, &[4, 4]).unwrap();
        let b = TensorShape::new(DType::Float16, &[4, 4]).unwrap();
        let dense = TensorShape::with_strides(DType::Float16, &[4, 4], &[4, 1]).unwrap();
        let transposed = TensorShape::with_strides(DType::Float16, &[4, 4], &[1, 4]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, dense);
        assert_ne!(a, transposed);
        assert_eq!(a.nbytes().unwrap(), transposed.nbytes().unwrap());
        assert_eq!(TensorShape::default(), TensorShape::default());
    }

    #[test]
    fn default_shape_text_matches_an_engine_invalid_shape() {
        stub::reset();
        let explicit = TensorShape::alloc(DType::Invalid, &[], &[]).unwrap();
        assert_eq!(TensorShape::default(), explicit);
        assert_eq!(TensorShape::default().to_string(), explicit.to_string());
        drop(explicit);
        assert_eq!(stub::stats().shapes.live(), 0);
    }

    #[test]
    fn engine_rejection_leaks_nothing() {
        stub::reset();
        let err = TensorShape::new(DType::Float32, &[2, -1]).unwrap_err();
        assert_eq!(err.engine_message(), Some("Negative dimension size: -1"));
        stub::fail_next_call("shape table full");
        let err = TensorShape::new(DType::Int32, &[8]).unwrap_err();
        assert_eq!(err.to_string(), "shape table full");
        assert_eq!(stub::stats().live_handles(), 0);
    }

    #[test]
    fn shared_handle_is_equal_even_when_the_engine_fails() {
        stub::reset();
        let a = TensorShape::new(DType::Int32, &[2, 2]).unwrap();
        let b = TensorShape::new(DType::Int32, &[2, 2]).unwrap();
        let alias = a.clone();

        stub::fail_next_call("repr unavailable");
        assert_eq!(a, alias);
        assert_eq!(stub::stats().failures, 0);

        assert_ne!(a, b);
        assert_eq!(stub::stats().failures, 1);
        assert_eq!(a, b);
        assert_eq!(stub::stats().strings.live(), 0);
    }

    #[test]
    fn oversized_shape_is_rejected_by_the_engine() {
        stub::reset();
        let err = TensorShape::new(DType::Int8, &[1 << 33, 1 << 33]).unwrap_err();
        assert_eq!(err.engine_message(), Some("Shape too large"));
        assert_eq!(stub::stats().live_handles(), 0);
    }

    #[test]
    fn wrapping_shares_the_handle() {
        stub::reset();
        let shape = TensorShape::new(DType::UInt8, &[16]).unwrap();
        let handle = shape.handle().cloned().unwrap();
        let wrapped = TensorShape::from_handle(handle);
        assert_eq!(wrapped.as_ptr(), shape.as_ptr());
        drop(shape);
        assert_eq!(wrapped.nbytes().unwrap(), 16);
        drop(wrapped);
        let stats = stub::stats();
        assert_eq!(stats.shapes.allocated, 1);
        assert_eq!(stats.shapes.released, 1);
    }

    #[test]
    fn display_uses_engine_text() {
        stub::reset();
        let shape = TensorShape::new(DType::Float32, &[2, 3]).unwrap();
        assert_eq!(shape.to_string(), "f32(2, 3):(3, 1):24 bytes");
        assert_eq!(format!("{shape:?}"), "TensorShape(f32(2, 3):(3, 1):24 bytes)");
    }
}
