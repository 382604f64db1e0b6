use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn,adlens_core=info,adlens_runner=info,adlens=info";

/// Same as [`DEFAULT_FILTER`] with the pipeline crates at debug.
pub const VERBOSE_FILTER: &str = "warn,adlens_core=debug,adlens_runner=debug,adlens=debug";

/// Install the global fmt subscriber, writing to stderr so command output on
/// stdout stays machine-readable.
pub fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))
}
