//! Tracing setup.
//!
//! Filter comes from `TELEAI_LOG`, then `RUST_LOG`, then defaults to `info`
//! for this crate and `warn` for everything else.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "TELEAI_LOG";

const DEFAULT_FILTER: &str = "warn,teleai=info";

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Returns false if one was already set,
/// which makes repeated calls harmless.
pub fn init_logging() -> bool {
    tracing_subscriber::registry()
        .with(build_filter())
        .with(fmt::layer().with_target(true).with_level(true))
        .try_init()
        .is_ok()
}
