// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::error::CoreResult;
use crate::ffi;
use plaidml_sys as sys;
use tracing::debug;

/// Process-wide engine settings. Nothing is cached here; every access is
/// forwarded to the engine, which decides which keys exist.
pub struct Settings;

impl Settings {
    pub fn get(key: &str) -> CoreResult<String> {
        let key = ffi::c_string(key)?;
        ffi::call_string(|err| unsafe { sys::plaidml_settings_get(err, key.as_ptr()) })
    }

    pub fn set(key: &str, value: &str) -> CoreResult<()> {
        let c_key = ffi::c_string(key)?;
        let c_value = ffi::c_string(value)?;
        ffi::call(|err| unsafe { sys::plaidml_settings_set(err, c_key.as_ptr(), c_value.as_ptr()) })?;
        debug!(key, value, "engine setting updated");
        Ok(())
    }
}
