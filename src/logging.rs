//! Diagnostic logging.
//!
//! Progress lines are plain stdout output; diagnostics go through `tracing`
//! to stderr so they never mix with the progress lines or the JSON report.
//!
//! The filter is taken from, in order: the `CONCATENATOR_LOG` environment
//! variable, `--verbose` (`debug`), the config file's `[logging] level`, and
//! finally `warn`.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "CONCATENATOR_LOG";

const DEFAULT_LEVEL: &str = "warn";

/// Pick the filter directive to use when no environment override is set.
#[must_use]
pub fn default_directive(verbose: bool, configured: Option<&str>) -> &str {
    if verbose {
        "debug"
    } else {
        configured.unwrap_or(DEFAULT_LEVEL)
    }
}

/// Build the `EnvFilter` for this process.
///
/// # Errors
///
/// Returns an error if the chosen directive cannot be parsed.
pub fn build_filter(verbose: bool, configured: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    let directive = default_directive(verbose, configured);
    EnvFilter::try_new(directive)
        .with_context(|| format!("Invalid log level directive: {directive:?}"))
}

/// Install the global subscriber writing to stderr.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed.
pub fn init_logging(verbose: bool, configured: Option<&str>) -> Result<()> {
    let filter = build_filter(verbose, configured)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialize logging")
}
