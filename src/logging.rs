//! Structured logging bootstrap using `tracing`.
//!
//! Logs go to stderr so that tables written to stdout stay machine-readable.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter for a given count of `-v` flags; `RUST_LOG` overrides it.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "adoptix=info,tower_http=info,warn",
        1 => "adoptix=debug,tower_http=debug,info",
        _ => "trace",
    }
}

/// Install the global subscriber once per process.
pub fn init_tracing(verbosity: u8) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbosity)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(verbosity > 0)
        .with_line_number(verbosity > 0)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;
    tracing::debug!(verbosity, "tracing initialised");
    Ok(())
}
