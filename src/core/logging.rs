//! Logging setup
//!
//! Log lines go to stderr so that stdout stays pipeable. The filter comes from
//! `TAXO_LOG` or `RUST_LOG`, then the configured level.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global subscriber. `verbose` forces debug output.
pub fn init(default_level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("taxo=debug")
    } else {
        EnvFilter::try_from_env("TAXO_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .try_init();
}

/// Subscriber for tests, captured per test
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
