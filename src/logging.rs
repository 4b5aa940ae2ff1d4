//! Diagnostic logging to stderr.
//!
//! Stdout carries the status line, so every log record goes to stderr.
//! `RUST_LOG` takes precedence; otherwise only warnings are shown, or
//! everything from this crate at debug level when `debug` is set.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "warn,claude_status_line=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(debug: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .without_time(),
        )
        .try_init();
}
