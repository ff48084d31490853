//! Log setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset, empty, or can't be parsed.
const DEFAULT_DIRECTIVES: &str = "info";

/// `RUST_LOG` wins when it's set and valid; otherwise log at `info`.
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install a `tracing` subscriber that writes to stderr, keeping stdout for
/// results.
pub fn init_logging() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}
