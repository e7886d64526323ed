use tracing_subscriber::EnvFilter;

/// Initialise logging. The default level is `info`; `debug` level can be
/// explicitly enabled via the configuration file.
pub fn init(debug: bool) {
    // When debug logging is disabled we force `info` level regardless of the
    // `RUST_LOG` environment variable. This prevents accidental verbose output
    // if the variable happens to be set in the host's environment.
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        // Allow `RUST_LOG` to override the level when debug logging is enabled.
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    // `try_init` so a subscriber installed by the embedding host wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
