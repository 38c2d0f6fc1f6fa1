//! Structured logging configuration.
//!
//! The game library logs through the `log` facade; those records are bridged
//! into the same `tracing` subscriber as the HTTP layer.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,tower_http=warn";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use bluff_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a connection lifecycle event
///
/// # Arguments
///
/// * `event` - What happened (`connected`, `disconnected`, ...)
/// * `client_id` - Connection identifier
/// * `detail` - Optional extra context
pub fn log_connection_event(event: &str, client_id: &str, detail: Option<&str>) {
    tracing::info!(
        event = event,
        client_id = client_id,
        detail = detail,
        "WebSocket {}",
        event
    );
}

/// Log a message dropped by a rate limiter
pub fn log_rate_limited(client_id: &str, limiter: &str, limit: usize) {
    tracing::warn!(
        client_id = client_id,
        limiter = limiter,
        limit = limit,
        "Rate limit exceeded, dropping message"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_log_helpers_without_subscriber() {
        // Just ensure they don't panic
        log_connection_event("connected", "ABCDEFGH", None);
        log_connection_event("disconnected", "ABCDEFGH", Some("socket error"));
        log_rate_limited("ABCDEFGH", "burst", 10);
    }
}
