//! # apt-settings
//!
//! Layered configuration for the APT matching engine.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`AptSettings::default()`]
//! 2. **User file**: `~/.apt/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `APT_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path, validate};
pub use types::*;

use std::sync::OnceLock;

static SETTINGS: OnceLock<AptSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// The first call loads `~/.apt/settings.json` with env overrides and
/// caches the result; if loading fails, compiled defaults are cached
/// instead and the failure is logged.
pub fn get_settings() -> &'static AptSettings {
    SETTINGS.get_or_init(|| {
        load_settings().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load settings, using defaults");
            AptSettings::default()
        })
    })
}

/// Initialize the global settings with a specific value.
///
/// Returns the settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: AptSettings) -> std::result::Result<(), AptSettings> {
    SETTINGS.set(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_settings_are_cached() {
        let first = get_settings();
        let second = get_settings();
        assert!(std::ptr::eq(first, second));
        assert!(init_settings(AptSettings::default()).is_err());
    }
}
