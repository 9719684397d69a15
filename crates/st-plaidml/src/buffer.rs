// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Engine-managed buffers and the views that map them into host memory.

use crate::error::{CoreError, CoreResult};
use crate::ffi;
use crate::handle::Handle;
use crate::shape::TensorShape;
use plaidml_sys as sys;
use std::marker::PhantomData;
use tracing::debug;

/// Block of device or host memory owned by the engine.
///
/// Clones share one engine handle. The buffer keeps its own copy of the
/// shape it was created with. Its contents are reached only through a
/// [`View`].
#[derive(Clone, Debug)]
pub struct Buffer {
    handle: Handle<sys::plaidml_buffer>,
    shape: TensorShape,
}

impl Buffer {
    /// Allocates `shape.nbytes()` bytes on `device`.
    pub fn new(device: &str, shape: &TensorShape) -> CoreResult<Self> {
        let device_id = ffi::c_string(device)?;
        let nbytes = shape.nbytes()?;
        let size = host_size(nbytes)?;
        let ptr =
            ffi::call(|err| unsafe { sys::plaidml_buffer_alloc(err, device_id.as_ptr(), size) })?;
        // SAFETY: freshly allocated by the engine and owned by nobody else.
        let handle = unsafe { Handle::from_raw(ptr)? };
        debug!(device, size, "allocated buffer");
        Ok(Self {
            handle,
            shape: shape.clone(),
        })
    }

    /// Adopts a raw buffer handle together with the shape the caller asserts
    /// it holds. The buffer's real size is not checked against the shape.
    ///
    /// # Safety
    /// `ptr` must be a live buffer handle that nothing else will release.
    pub unsafe fn from_raw(ptr: *mut sys::plaidml_buffer, shape: &TensorShape) -> CoreResult<Self> {
        Ok(Self::from_handle(Handle::from_raw(ptr)?, shape))
    }

    pub fn from_handle(handle: Handle<sys::plaidml_buffer>, shape: &TensorShape) -> Self {
        Self {
            handle,
            shape: shape.clone(),
        }
    }

    pub fn shape(&self) -> &TensorShape {
        &self.shape
    }

    pub fn handle(&self) -> &Handle<sys::plaidml_buffer> {
        &self.handle
    }

    pub fn as_ptr(&self) -> *mut sys::plaidml_buffer {
        self.handle.as_ptr()
    }

    /// Maps the buffer's current contents for reading.
    pub fn mmap_current(&self) -> CoreResult<View<'_>> {
        let ptr = self.as_ptr();
        let view = ffi::call(|err| unsafe { sys::plaidml_buffer_mmap_current(err, ptr) })?;
        View::adopt(view, MapMode::Current)
    }

    /// Maps the buffer for overwriting. Existing contents are not preserved and
    /// nothing reaches the buffer until [`View::writeback`].
    pub fn mmap_discard(&self) -> CoreResult<View<'_>> {
        let ptr = self.as_ptr();
        let view = ffi::call(|err| unsafe { sys::plaidml_buffer_mmap_discard(err, ptr) })?;
        View::adopt(view, MapMode::Discard)
    }

    /// Copies the whole buffer into the front of `dst` and returns the number
    /// of bytes copied.
    pub fn copy_into(&self, dst: &mut [u8]) -> CoreResult<usize> {
        let view = self.mmap_current()?;
        let src = view.as_slice()?;
        if dst.len() < src.len() {
            return Err(CoreError::BufferTooSmall {
                needed: src.len(),
                available: dst.len(),
            });
        }
        dst[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    /// Overwrites the whole buffer from the front of `src`, writes it back and
    /// returns the number of bytes copied.
    pub fn copy_from(&self, src: &[u8]) -> CoreResult<usize> {
        let mut view = self.mmap_discard()?;
        let dst = view.as_mut_slice()?;
        if src.len() < dst.len() {
            return Err(CoreError::BufferTooSmall {
                needed: dst.len(),
                available: src.len(),
            });
        }
        let copied = dst.len();
        dst.copy_from_slice(&src[..copied]);
        view.writeback()?;
        Ok(copied)
    }

    /// Copies `view.size()` bytes into `dst`.
    ///
    /// # Safety
    /// `dst` must be valid for writes of the buffer's mapped size.
    pub unsafe fn copy_into_raw(&self, dst: *mut u8) -> CoreResult<()> {
        let view = self.mmap_current()?;
        let size = view.size()?;
        if size > 0 {
            std::ptr::copy_nonoverlapping(view.data()? as *const u8, dst, size);
        }
        Ok(())
    }

    /// Copies `view.size()` bytes from `src` and writes them back.
    ///
    /// # Safety
    /// `src` must be valid for reads of the buffer's mapped size.
    pub unsafe fn copy_from_raw(&self, src: *const u8) -> CoreResult<()> {
        let view = self.mmap_discard()?;
        let size = view.size()?;
        if size > 0 {
            std::ptr::copy_nonoverlapping(src, view.data()?, size);
        }
        view.writeback()
    }

    /// Reads the whole buffer into a fresh vector.
    pub fn to_vec(&self) -> CoreResult<Vec<u8>> {
        let view = self.mmap_current()?;
        Ok(view.as_slice()?.to_vec())
    }
}

fn host_size(bytes: u64) -> CoreResult<usize> {
    usize::try_from(bytes).map_err(|_| CoreError::HostOverflow { bytes })
}

/// Intent a view was mapped with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapMode {
    /// Existing contents, read by convention.
    Current,
    /// Fresh contents to be written in full and committed with writeback.
    Discard,
}

/// Mapping of a [`Buffer`]'s memory into the host address space.
///
/// A view lives no longer than the buffer it maps and is released when
/// dropped. Whether views of one buffer may coexist, and what `writeback`
/// does on a current view, is up to the engine.
#[derive(Debug)]
pub struct View<'a> {
    handle: Handle<sys::plaidml_view>,
    mode: MapMode,
    _buffer: PhantomData<&'a Buffer>,
}

impl<'a> View<'a> {
    fn adopt(ptr: *mut sys::plaidml_view, mode: MapMode) -> CoreResult<Self> {
        // SAFETY: freshly mapped by the engine and owned by nobody else.
        let handle = unsafe { Handle::from_raw(ptr)? };
        debug!(?mode, "mapped buffer view");
        Ok(Self {
            handle,
            mode,
            _buffer: PhantomData,
        })
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    /// Start of the mapped bytes, valid until the view is dropped.
    pub fn data(&self) -> CoreResult<*mut u8> {
        let ptr = self.handle.as_ptr();
        let data = ffi::call(|err| unsafe { sys::plaidml_view_data(err, ptr) })?;
        Ok(data as *mut u8)
    }

    /// Length of the mapped window in bytes.
    pub fn size(&self) -> CoreResult<usize> {
        let ptr = self.handle.as_ptr();
        ffi::call(|err| unsafe { sys::plaidml_view_size(err, ptr) })
    }

    /// Commits the view's bytes to the buffer.
    pub fn writeback(&self) -> CoreResult<()> {
        let ptr = self.handle.as_ptr();
        ffi::call(|err| unsafe { sys::plaidml_view_writeback(err, ptr) })
    }

    pub fn as_slice(&self) -> CoreResult<&[u8]> {
        let (data, size) = self.window()?;
        if size == 0 {
            return Ok(&[]);
        }
        // SAFETY: the engine keeps `size` bytes at `data` mapped while the view lives.
        Ok(unsafe { std::slice::from_raw_parts(data, size) })
    }

    pub fn as_mut_slice(&mut self) -> CoreResult<&mut [u8]> {
        let (data, size) = self.window()?;
        if size == 0 {
            return Ok(&mut []);
        }
        // SAFETY: as in `as_slice`; `&mut self` keeps this the only slice of the view.
        Ok(unsafe { std::slice::from_raw_parts_mut(data, size) })
    }

    fn window(&self) -> CoreResult<(*mut u8, usize)> {
        let size = self.size()?;
        let data = self.data()?;
        if data.is_null() && size > 0 {
            return Err(CoreError::NullHandle("view data"));
        }
        Ok((data, size))
    }
}
