use anyhow::{anyhow, Result};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Initialize console logging.
///
/// Defaults to `info`; the `RUST_LOG` env var takes precedence.
pub fn init() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // Use stderr for logs, stdout for CLI output
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
