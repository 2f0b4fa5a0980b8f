//! Structured logging setup.
//!
//! All APT crates log through `tracing`. Library code never installs a
//! subscriber; the embedding application calls [`init_subscriber`] once at
//! startup (or relies on its own subscriber).

use tracing_subscriber::EnvFilter;

/// Default filter directive when neither `RUST_LOG` nor a level is supplied.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Initialize the global tracing subscriber with compact stderr output.
///
/// `RUST_LOG` takes precedence over `level`. Subsequent calls are no-ops.
pub fn init_subscriber(level: &str) {
    let level = if level.trim().is_empty() {
        DEFAULT_LOG_LEVEL
    } else {
        level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}

/// Initialize the global subscriber with newline-delimited JSON output.
///
/// Intended for services that ship logs to a collector. Subsequent calls
/// are no-ops.
pub fn init_json_subscriber(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json();

    let _ = subscriber.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_subscriber_is_idempotent() {
        init_subscriber("debug");
        init_subscriber("");
        init_json_subscriber("info");
    }
}
