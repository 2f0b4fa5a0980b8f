//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`AptSettings::default()`]
//! 2. If `~/.apt/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `APT_*` environment variable overrides (highest priority)
//! 4. Validate ranges
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::AptSettings;

/// Resolve the path to the settings file (`~/.apt/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".apt").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<AptSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or out-of-range values are
/// errors.
pub fn load_settings_from_path(path: &Path) -> Result<AptSettings> {
    let defaults = serde_json::to_value(AptSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: AptSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Check cross-field constraints the type system cannot express.
pub fn validate(settings: &AptSettings) -> Result<()> {
    let invalid = |field: &'static str, reason: String| {
        Err(SettingsError::InvalidValue { field, reason })
    };
    let search = &settings.search;
    if search.chunk_size == 0 {
        return invalid("search.chunkSize", "must be positive".into());
    }
    if !(1..=64).contains(&search.lsh_bits) {
        return invalid(
            "search.lshBits",
            format!("must be in 1..=64, got {}", search.lsh_bits),
        );
    }
    if search.lsh_bits > settings.embedding.dimensions {
        return invalid(
            "search.lshBits",
            format!(
                "{} exceeds embedding.dimensions ({})",
                search.lsh_bits, settings.embedding.dimensions
            ),
        );
    }
    let rate = settings.evolution.learning_rate;
    if !(rate.is_finite() && rate > 0.0 && rate < 1.0) {
        return invalid("evolution.learningRate", format!("must be in (0, 1), got {rate}"));
    }
    let matching = &settings.matching;
    if !(matching.personality_weight.is_finite() && matching.style_weight.is_finite()) {
        return invalid("matching", "weights must be finite".into());
    }
    Ok(())
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (file/default value is kept).
pub fn apply_env_overrides(settings: &mut AptSettings) {
    // ── Embedding gateway ───────────────────────────────────────────
    if let Some(v) = read_env_string("APT_EMBEDDING_URL") {
        settings.embedding.base_url = v;
    }
    if let Some(v) = read_env_string("APT_EMBEDDING_MODEL") {
        settings.embedding.model = v;
    }
    if let Some(v) = read_env_u64("APT_EMBEDDING_TIMEOUT_MS", 100, 600_000) {
        settings.embedding.timeout_ms = v;
    }
    if let Some(v) = read_env_u64("APT_MAX_RETRIES", 0, 20) {
        settings.retry.max_retries = v as u32;
    }

    // ── Search ──────────────────────────────────────────────────────
    if let Some(v) = read_env_usize("APT_APPROX_THRESHOLD", 1, 100_000_000) {
        settings.search.approximate_threshold = v;
    }
    if let Some(v) = read_env_usize("APT_LSH_BITS", 1, 64) {
        settings.search.lsh_bits = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("APT_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u64` within an inclusive range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `usize` within an inclusive range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

// ── Env var readers ─────────────────────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_usize(name: &str, min: usize, max: usize) -> Option<usize> {
    let val = std::env::var(name).ok()?;
    let result = parse_usize_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid usize env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override_keeps_siblings() {
        let target = serde_json::json!({"search": {"chunkSize": 256, "lshBits": 4}});
        let source = serde_json::json!({"search": {"lshBits": 6}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["search"]["lshBits"], 6);
        assert_eq!(merged["search"]["chunkSize"], 256);
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1});
        let merged = deep_merge(target, serde_json::json!({"a": null}));
        assert_eq!(merged["a"], 1);
    }

    #[test]
    fn merge_arrays_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let merged = deep_merge(target, serde_json::json!({"items": [9]}));
        assert_eq!(merged["items"], serde_json::json!([9]));
    }

    #[test]
    fn merge_adds_new_keys() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"b": 2}));
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let settings = load_settings_from_path(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings.version, AptSettings::default().version);
        assert_eq!(settings.builder.first_pole_weight, 1.2);
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"matching": {"limit": 25}, "retry": {"maxRetries": 5}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.matching.limit, 25);
        assert!(settings.matching.diversity_boost);
        assert_eq!(settings.retry.max_retries, 5);
        assert_eq!(settings.retry.base_delay_ms, 500);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn load_rejects_out_of_range_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"search": {"lshBits": 0}}"#).unwrap();

        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { field: "search.lshBits", .. }));
    }

    // ── validate ────────────────────────────────────────────────────

    #[test]
    fn validate_defaults_ok() {
        validate(&AptSettings::default()).unwrap();
    }

    #[test]
    fn validate_lsh_bits_cannot_exceed_dimensions() {
        let mut settings = AptSettings::default();
        settings.embedding.dimensions = 32;
        settings.search.lsh_bits = 48;
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn validate_learning_rate_bounds() {
        let mut settings = AptSettings::default();
        settings.evolution.learning_rate = 1.5;
        assert!(validate(&settings).is_err());
        settings.evolution.learning_rate = f32::NAN;
        assert!(validate(&settings).is_err());
    }

    #[test]
    fn validate_chunk_size_positive() {
        let mut settings = AptSettings::default();
        settings.search.chunk_size = 0;
        assert!(validate(&settings).is_err());
    }

    // ── parsers ─────────────────────────────────────────────────────

    #[test]
    fn parse_u64_range_bounds() {
        assert_eq!(parse_u64_range("30000", 100, 600_000), Some(30_000));
        assert_eq!(parse_u64_range("99", 100, 600_000), None);
        assert_eq!(parse_u64_range("700000", 100, 600_000), None);
        assert_eq!(parse_u64_range("abc", 100, 600_000), None);
    }

    #[test]
    fn parse_usize_range_bounds() {
        assert_eq!(parse_usize_range("8", 1, 64), Some(8));
        assert_eq!(parse_usize_range("0", 1, 64), None);
        assert_eq!(parse_usize_range(" 64 ", 1, 64), Some(64));
    }
}
