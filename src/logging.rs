//! Diagnostic logging setup.
//!
//! The run transcript goes to stdout through [`crate::report`]; tracing is
//! reserved for diagnostics and always writes to stderr so transcripts stay
//! pipeable.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "linkfarm=debug"
    } else {
        "linkfarm=warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
