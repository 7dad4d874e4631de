use tracing_subscriber::EnvFilter;

/// Default filter directive for a log level
pub fn default_filter(level: &str) -> String {
    format!("episode_finder={level}")
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Output goes to stderr so that
/// search results on stdout stay machine-readable. Calling this twice is
/// harmless.
pub fn init_tracing(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
