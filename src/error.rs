//! Server construction and lifecycle errors.

use thiserror::Error;

use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::lifecycle::LifecycleState;

/// Errors surfaced by [`RepositoryServer`](crate::RepositoryServer).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("service graph construction failed: {0}")]
    Graph(#[from] GraphError),

    /// A lifecycle call made in the wrong state, e.g. `start` twice.
    #[error("cannot {operation} a server that is {state}")]
    Lifecycle {
        operation: &'static str,
        state: LifecycleState,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server terminated with error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("HTTP server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    /// Whether this is a usage error rather than an environmental failure.
    pub fn is_lifecycle_misuse(&self) -> bool {
        matches!(self, ServerError::Lifecycle { .. })
    }
}
