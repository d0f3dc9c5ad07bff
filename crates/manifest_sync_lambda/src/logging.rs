use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_VAR: &str = "MANIFEST_SYNC_LOG";

/// Installs a JSON `tracing` subscriber for CloudWatch.
///
/// The filter comes from `MANIFEST_SYNC_LOG`, then `RUST_LOG`, then `info`.
/// Resolver events carry `component` and `event` fields; keys and counts are
/// recorded as fields rather than formatted into the message.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .with_current_span(false)
        .with_target(false)
        .init();
}

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
