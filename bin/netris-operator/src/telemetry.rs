//! Tracing subscriber setup

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. Production logs are JSON at info level;
/// dev mode switches to human-readable output at debug level. `RUST_LOG`
/// overrides either default.
pub fn init(dev_mode: bool) {
    let default_directive = if dev_mode { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},hyper=info,kube=info", default_directive)));

    if dev_mode {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }
}
