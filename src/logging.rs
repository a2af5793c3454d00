use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Installs a compact fmt subscriber. `RUST_LOG` directives are honored on
/// top of `level`. Fails if a global subscriber is already set.
pub fn init_logging(level: &str) -> Result<()> {
    let level = level.parse::<Level>()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
