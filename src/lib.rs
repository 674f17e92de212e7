pub mod api; // HTTP service: /health, /version, /quality
pub mod config;
pub mod pipeline; // decode → orientation → resize → grayscale → metrics → decision
pub mod tuning; // Offline threshold suggestions for tune-blur

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides `level` when set. With `json` every event is one JSON
/// object per line; otherwise the compact human format is used.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter(level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if json {
        builder
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .init();
    } else {
        builder.compact().init();
    }
}
