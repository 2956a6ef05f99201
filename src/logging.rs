//! Structured logging for the provider process.
//!
//! Logs go to **stderr**: stdout carries the handshake line the host reads
//! to find the gRPC address. Filtering follows `RUST_LOG`, e.g.
//!
//! ```bash
//! RUST_LOG=vpsie_provider=debug ./vpsie-provider
//! RUST_LOG=vpsie_provider::wait=debug,info ./vpsie-provider
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Level used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LEVEL: &str = "info";

/// Install the global subscriber at the [`DEFAULT_LEVEL`].
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging() -> bool {
    init_logging_with_default(DEFAULT_LEVEL)
}

/// Install the global subscriber, falling back to `default_level` when
/// `RUST_LOG` does not provide a filter.
pub fn init_logging_with_default(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        // Only one global subscriber can exist per process.
        init_logging();
        assert!(!init_logging_with_default("debug"));
    }
}
