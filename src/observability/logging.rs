//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the binaries
//! - Configure log level from `RUST_LOG`, with a fallback filter
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - The subscriber does not capture `log` records by itself; see
//!   `bridge.rs` for the opt-in route

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "schema_repo_server=debug,tower_http=info";

/// Install the global subscriber. Fails if one is already set.
pub fn init_tracing(fallback: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
