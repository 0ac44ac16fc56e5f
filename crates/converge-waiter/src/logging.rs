//! Tracing subscriber setup

use tracing::Level;
use tracing_subscriber::EnvFilter;

pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Install a fmt subscriber filtered by `RUST_LOG`, with `default` added as a
/// directive. Fails if a global subscriber is already set.
pub fn try_init_tracing(default: Level) -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default.into()))
        .try_init()
}

/// Initialize logging at `info`.
pub fn init_tracing() -> Result<(), InitError> {
    try_init_tracing(Level::INFO)
}
