//! Settings error types.

use thiserror::Error;

/// Errors from loading `~/.apt/settings.json`.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file exists but could not be read.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON, or a section has the wrong shape.
    #[error("failed to parse settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A value parsed but is outside the range the engine accepts.
    #[error("invalid settings value for {field}: {reason}")]
    InvalidValue {
        /// camelCase path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_json_maps_to_json_variant() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let err: SettingsError = json_err.into();
        assert!(matches!(err, SettingsError::Json(_)));
        assert!(err.to_string().contains("parse settings JSON"));
    }

    #[test]
    fn invalid_value_names_the_field() {
        let err = SettingsError::InvalidValue {
            field: "search.lshBits",
            reason: "must be in 1..=64, got 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid settings value for search.lshBits: must be in 1..=64, got 0"
        );
    }
}
