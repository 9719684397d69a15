// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::ffi::NulError;
use thiserror::Error;

/// Result type for every binding operation.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The engine reported a nonzero error code; the message is its own text.
    #[error("{0}")]
    Engine(String),

    #[error("Sizes and strides must have the same rank.")]
    RankMismatch { sizes: usize, strides: usize },

    #[error("engine returned a null {0} handle")]
    NullHandle(&'static str),

    #[error("engine returned unknown data type code {0}")]
    UnknownDType(i32),

    #[error("unknown data type name '{0}'")]
    UnknownDTypeName(String),

    #[error("string cannot cross the C boundary: {0}")]
    InteriorNul(#[from] NulError),

    #[error("{bytes} bytes exceed the host address space")]
    HostOverflow { bytes: u64 },

    #[error("host slice holds {available} bytes but the view maps {needed}")]
    BufferTooSmall { needed: usize, available: usize },
}

impl CoreError {
    /// Returns the engine's message when the failure came from the engine.
    pub fn engine_message(&self) -> Option<&str> {
        match self {
            CoreError::Engine(message) => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_engine_failures_carry_an_engine_message() {
        assert_eq!(
            CoreError::Engine("device lost".into()).engine_message(),
            Some("device lost")
        );
        let local = CoreError::HostOverflow { bytes: u64::MAX };
        assert_eq!(local.engine_message(), None);
        assert_eq!(
            local.to_string(),
            format!("{} bytes exceed the host address space", u64::MAX)
        );
    }
}
