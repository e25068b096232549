//! HTTP surface of the repository server.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (listener lifecycle, axum::serve)
//!     → routes.rs (route table: trace, timeout, body limit, per-group metrics)
//!     → machine.rs | human.rs | auxiliary.rs (handlers over the service graph)
//!     → response.rs (format negotiation, error mapping)
//!     → Send to client
//! ```

pub mod auxiliary;
pub mod human;
pub mod machine;
pub mod response;
pub mod routes;
pub mod server;

pub use server::RepositoryServer;
