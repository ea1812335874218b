//! Tracing subscriber for the binary. Logs go to stderr so stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `filter` (an `EnvFilter` directive such as `info` or
/// `courier_rs=debug,sqlx=warn`). Falls back to `info` on an unparsable directive. A second call
/// is a no-op.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
