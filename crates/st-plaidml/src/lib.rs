// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Safe bindings over the PlaidML core C API.
//!
//! Each engine object (shape, buffer, view) is held by a reference-counted
//! [`Handle`] that releases it exactly once. Engine failures come back as
//! [`CoreError::Engine`] carrying the engine's own message.
//!
//! Call [`init`] before anything else. Whether repeated calls are safe is up
//! to the engine.

pub mod buffer;
pub mod dtype;
pub mod error;
mod ffi;
pub mod handle;
pub mod profile;
pub mod settings;
pub mod shape;
pub mod telemetry;

pub use buffer::{Buffer, MapMode, View};
pub use dtype::DType;
pub use error::{CoreError, CoreResult};
pub use handle::{Handle, Release};
pub use profile::{ProfileError, SettingsProfile};
pub use settings::Settings;
pub use shape::{dense_strides, TensorShape};

use plaidml_sys as sys;
use std::ffi::CStr;
use tracing::info;

/// Starts the engine's core API.
pub fn init() -> CoreResult<()> {
    ffi::call(|err| unsafe { sys::plaidml_init(err) })?;
    info!("plaidml core initialised");
    Ok(())
}

/// [`init`] followed by applying `profile`.
pub fn init_with_profile(profile: &SettingsProfile) -> Result<(), ProfileError> {
    init().map_err(ProfileError::Init)?;
    profile.apply()
}

/// The engine's version string.
pub fn version() -> CoreResult<String> {
    let ptr = ffi::call(|err| unsafe { sys::plaidml_version(err) })?;
    if ptr.is_null() {
        return Err(CoreError::NullHandle("version"));
    }
    // SAFETY: the engine returns a static, NUL-terminated string.
    Ok(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

#[cfg(all(test, not(feature = "system")))]
mod tests {
    use super::*;
    use plaidml_sys::stub;

    #[test]
    fn init_forwards_to_the_engine() {
        stub::reset();
        init().unwrap();
        init().unwrap();
        assert_eq!(stub::stats().init_calls, 2);
    }

    #[test]
    fn version_is_copied_without_release() {
        stub::reset();
        let version = version().unwrap();
        assert!(version.starts_with("stub-"));
        assert_eq!(stub::stats().strings.allocated, 0);
    }

    #[test]
    fn init_failure_is_reported_through_the_profile_path() {
        stub::reset();
        stub::fail_next_call("engine offline");
        let err = init_with_profile(&SettingsProfile::new()).unwrap_err();
        assert!(err.to_string().contains("engine offline"));
    }
}
