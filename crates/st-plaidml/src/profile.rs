// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Engine settings loaded from a TOML profile.
//!
//! ```toml
//! [settings]
//! PLAIDML_DEVICE = "llvm_cpu.0"
//! PLAIDML_VERBOSE = 1
//! ```
//!
//! Scalar values are passed to the engine as their textual form.

use crate::error::CoreError;
use crate::settings::Settings;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the profile picked up by [`SettingsProfile::discover`].
pub const PROFILE_ENV: &str = "PLAIDML_SETTINGS_PROFILE";

#[derive(Debug, Default, Deserialize)]
struct RawProfile {
    #[serde(default)]
    settings: BTreeMap<String, toml::Value>,
}

/// Ordered set of engine settings to apply in one go.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsProfile {
    settings: BTreeMap<String, String>,
    source: Option<PathBuf>,
}

impl SettingsProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one entry.
    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ProfileError> {
        let raw: RawProfile = toml::from_str(text).map_err(|source| ProfileError::Toml {
            path: None,
            source,
        })?;
        let mut settings = BTreeMap::new();
        for (key, value) in raw.settings {
            let text = match value {
                toml::Value::String(text) => text,
                toml::Value::Integer(number) => number.to_string(),
                toml::Value::Float(number) => number.to_string(),
                toml::Value::Boolean(flag) => flag.to_string(),
                toml::Value::Datetime(stamp) => stamp.to_string(),
                toml::Value::Array(_) | toml::Value::Table(_) => {
                    return Err(ProfileError::Unsupported { key })
                }
            };
            settings.insert(key, text);
        }
        Ok(Self {
            settings,
            source: None,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut profile = Self::from_toml_str(&text).map_err(|err| match err {
            ProfileError::Toml { source, .. } => ProfileError::Toml {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })?;
        profile.source = Some(path.to_path_buf());
        debug!(path = %path.display(), entries = profile.len(), "loaded settings profile");
        Ok(profile)
    }

    /// Loads the profile named by [`PROFILE_ENV`]. Returns `None` when the
    /// variable is unset or empty, or when the file does not exist.
    pub fn discover() -> Result<Option<Self>, ProfileError> {
        let path = match std::env::var(PROFILE_ENV) {
            Ok(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
            _ => return Ok(None),
        };
        if !path.exists() {
            debug!(path = %path.display(), "settings profile not found");
            return Ok(None);
        }
        Self::from_path(path).map(Some)
    }

    /// Forwards every entry to the engine in key order. Stops at the first
    /// rejected entry.
    pub fn apply(&self) -> Result<(), ProfileError> {
        for (key, value) in &self.settings {
            Settings::set(key, value).map_err(|source| ProfileError::Apply {
                key: key.clone(),
                source,
            })?;
        }
        info!(entries = self.settings.len(), source = ?self.source, "applied settings profile");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.settings
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// File the profile was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML {path:?}: {source}")]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },
    #[error("setting '{key}' must be a string, number or boolean")]
    Unsupported { key: String },
    #[error("engine initialisation failed: {0}")]
    Init(#[source] CoreError),
    #[error("engine rejected setting '{key}': {source}")]
    Apply {
        key: String,
        #[source]
        source: CoreError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_become_text() {
        let profile = SettingsProfile::from_toml_str(
            r#"
            [settings]
            PLAIDML_DEVICE = "llvm_cpu.0"
            PLAIDML_VERBOSE = 2
            PLAIDML_DEBUG = true
            PLAIDML_RATIO = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(profile.len(), 4);
        assert_eq!(profile.get("PLAIDML_DEVICE"), Some("llvm_cpu.0"));
        assert_eq!(profile.get("PLAIDML_VERBOSE"), Some("2"));
        assert_eq!(profile.get("PLAIDML_DEBUG"), Some("true"));
        assert_eq!(profile.get("PLAIDML_RATIO"), Some("0.5"));
        assert!(profile.source().is_none());
    }

    #[test]
    fn missing_table_is_empty() {
        let profile = SettingsProfile::from_toml_str("").unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn nested_values_are_refused() {
        let err = SettingsProfile::from_toml_str("[settings]\nDEVICES = [\"a\", \"b\"]\n")
            .unwrap_err();
        assert!(matches!(err, ProfileError::Unsupported { ref key } if key == "DEVICES"));
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(matches!(
            SettingsProfile::from_toml_str("[settings\n"),
            Err(ProfileError::Toml { path: None, .. })
        ));
    }

    #[test]
    fn builder_entries_iterate_in_key_order() {
        let profile = SettingsProfile::new().with("B", "2").with("A", "1");
        let keys: Vec<_> = profile.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }
}
