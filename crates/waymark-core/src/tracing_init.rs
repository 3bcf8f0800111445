//! Tracing/logging initialization shared by Waymark binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// The filter applies `level` to the waymark crates only, so tunnel provider
/// chatter from dependency crates stays out of the operator log; `RUST_LOG`
/// overrides the whole filter when set. When `log_json` is `true`, emit
/// structured JSON log lines instead of the human-readable format.
pub fn init_tracing(level: &str, log_json: bool) {
    let default_filter = format!("waymark_daemon={level},waymark_core={level}");
    let env_filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or(default_filter));
    if log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
