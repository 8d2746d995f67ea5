use tracing_subscriber::{fmt, EnvFilter};

/// Initialize structured logging with environment filter.
/// Set PVR_LOG=debug (or trace, info, warn, error) for verbosity control.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Same as [`init_logging`], falling back to `default_filter` when PVR_LOG is unset.
/// A second call is a no-op.
pub fn init_logging_with_default(default_filter: &str) {
    let filter = EnvFilter::try_from_env("PVR_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}
