//! Logging setup shared by the dbscribe binary and its tests.

use tracing_subscriber::EnvFilter;

use crate::{Result, error::DbScribeError};

/// Maps the CLI verbosity flags to a tracing level.
///
/// `quiet` wins over any verbosity; otherwise 0 is INFO, 1 is DEBUG and
/// anything higher is TRACE.
pub fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Filter directives used when `RUST_LOG` is not set.
///
/// The CLI level applies to dbscribe's own crates; dependencies such as
/// the TDS driver stay at WARN (ERROR when quiet).
pub fn default_directives(verbose: u8, quiet: bool) -> String {
    let level = level_for(verbose, quiet);
    let dependencies = if quiet { "error" } else { "warn" };
    format!("{dependencies},dbscribe={level},dbscribe_core={level}")
}

/// Initializes logging to stderr, keeping stdout for the run summary.
///
/// `RUST_LOG` overrides the verbosity flags when set.
///
/// # Errors
/// Returns a configuration error if a global subscriber is already set
///
/// # Example
/// ```rust,no_run
/// use dbscribe_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| DbScribeError::configuration(format!("Failed to initialize logging: {e}")))
}
