//! Retry configuration and backoff calculation.
//!
//! Sync-only building blocks for the embedding gateway's retry loop, which
//! lives in `apt-embeddings` next to the tokio timer it needs:
//!
//! - [`RetryConfig`]: attempt budget, backoff, jitter
//! - [`calculate_backoff_delay`]: exponential backoff with caller-supplied randomness
//! - [`parse_retry_after_header`]: `Retry-After` header to milliseconds

use serde::{Deserialize, Serialize};

/// Default maximum retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
/// Default maximum delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;
/// Default jitter factor (0.0 to 1.0).
pub const DEFAULT_JITTER_FACTOR: f64 = 0.2;

/// Configuration for retry logic.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Base delay for exponential backoff in ms.
    pub base_delay_ms: u64,
    /// Maximum delay between attempts in ms.
    pub max_delay_ms: u64,
    /// Jitter factor 0.0 to 1.0.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            jitter_factor: DEFAULT_JITTER_FACTOR,
        }
    }
}

impl RetryConfig {
    /// Total attempts allowed (first try plus retries).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff before retry number `attempt` (1-based), using `random` in `[0, 1)`.
    pub fn delay_for(&self, attempt: u32, random: f64) -> u64 {
        calculate_backoff_delay(
            attempt.saturating_sub(1),
            self.base_delay_ms,
            self.max_delay_ms,
            self.jitter_factor,
            random,
        )
    }
}

/// Exponential backoff with symmetric jitter.
///
/// `min(max_delay, base_delay * 2^attempt) * (1 + (2 * random - 1) * jitter)`
///
/// `attempt` is zero-based; `random` should come from a PRNG in `[0.0, 1.0)`.
#[must_use]
pub fn calculate_backoff_delay(
    attempt: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    jitter_factor: f64,
    random: f64,
) -> u64 {
    let exponential = base_delay_ms.saturating_mul(1u64 << attempt.min(31));
    let capped = exponential.min(max_delay_ms);

    let jitter = 1.0 + (random * 2.0 - 1.0) * jitter_factor;
    let with_jitter = (capped as f64) * jitter;

    with_jitter.round().max(0.0) as u64
}

/// Parse a `Retry-After` header value into milliseconds.
///
/// Accepts delta-seconds (`"120"`) or an HTTP-date. Dates in the past
/// yield `0`.
#[must_use]
pub fn parse_retry_after_header(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(seconds.saturating_mul(1000));
    }

    let date = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let delay_ms = date
        .signed_duration_since(chrono::Utc::now())
        .num_milliseconds();
    Some(u64::try_from(delay_ms).unwrap_or(0))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_attempts(), 4);
        assert_eq!(config.base_delay_ms, 500);
        assert_eq!(config.max_delay_ms, 10_000);
        assert!((config.jitter_factor - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn retry_config_partial_json() {
        let config: RetryConfig = serde_json::from_str(r#"{"maxRetries": 7}"#).unwrap();
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.base_delay_ms, 500);
    }

    #[test]
    fn backoff_exponential_growth_without_jitter() {
        let delays: Vec<u64> = (0..4)
            .map(|a| calculate_backoff_delay(a, 1000, 60_000, 0.0, 0.5))
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000]);
    }

    #[test]
    fn backoff_caps_at_max() {
        assert_eq!(calculate_backoff_delay(10, 1000, 60_000, 0.0, 0.5), 60_000);
    }

    #[test]
    fn backoff_jitter_bounds() {
        assert_eq!(calculate_backoff_delay(0, 1000, 60_000, 0.2, 0.0), 800);
        assert_eq!(calculate_backoff_delay(0, 1000, 60_000, 0.2, 0.5), 1000);
        assert_eq!(calculate_backoff_delay(0, 1000, 60_000, 0.2, 1.0), 1200);
    }

    #[test]
    fn backoff_high_attempt_no_overflow() {
        let delay = calculate_backoff_delay(100, 1000, 60_000, 0.2, 0.99);
        assert!(delay > 0);
        assert!(delay <= 72_000);
    }

    #[test]
    fn delay_for_is_one_based() {
        let config = RetryConfig {
            jitter_factor: 0.0,
            ..RetryConfig::default()
        };
        assert_eq!(config.delay_for(1, 0.3), 500);
        assert_eq!(config.delay_for(2, 0.3), 1000);
        assert_eq!(config.delay_for(3, 0.3), 2000);
    }

    #[test]
    fn parse_retry_after_seconds() {
        assert_eq!(parse_retry_after_header("120"), Some(120_000));
        assert_eq!(parse_retry_after_header(" 1 "), Some(1000));
        assert_eq!(parse_retry_after_header("0"), Some(0));
    }

    #[test]
    fn parse_retry_after_invalid() {
        assert_eq!(parse_retry_after_header("soon"), None);
        assert_eq!(parse_retry_after_header(""), None);
    }

    #[test]
    fn parse_retry_after_past_date_is_zero() {
        assert_eq!(
            parse_retry_after_header("Thu, 01 Jan 2015 00:00:00 GMT"),
            Some(0)
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn backoff_within_jitter_envelope(
                attempt in 0u32..40,
                random in 0.0f64..1.0,
            ) {
                let delay = calculate_backoff_delay(attempt, 250, 8_000, 0.25, random);
                prop_assert!(delay <= 10_000);
                prop_assert!(delay >= 187);
            }
        }
    }
}
