//! Logging Setup
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` takes precedence over
//! the configured level.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive for a given debug flag.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "mentor_assistant=debug,mentor_tools=debug,mentor_llm=debug,info"
    } else {
        "info"
    }
}

/// Initialize logging to stderr.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place and return `false`.
pub fn init_logging(debug: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init()
        .is_ok()
}
