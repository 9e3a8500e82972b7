/*!
    Logging setup for the command-line tool.
*/

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/**
    Install a global subscriber writing to stderr.

    `RUST_LOG` takes precedence over `default_filter`. Calling this more than
    once leaves the first subscriber in place.
*/
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("tracing subscriber already installed");
    }
}
