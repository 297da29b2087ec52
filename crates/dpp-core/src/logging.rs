use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize a tracing subscriber for processes embedding the compiler.
///
/// The library crates only emit events; installing a subscriber is left to
/// the embedding program, which calls this once at startup.
///
/// Logs go to stderr so they never mix with output the editor reads from
/// stdout. The level comes from `RUST_LOG`, defaulting to "info". Fails when
/// a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
