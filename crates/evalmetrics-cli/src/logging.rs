use crate::types::LogLevel;
use std::io::IsTerminal;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging to stderr.
///
/// `RUST_LOG` wins when set; otherwise `--log-level` applies. Stdout stays
/// reserved for command output.
pub fn init_logging(level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    // A second initialization (e.g. from tests) is harmless.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}
