//! Schema repository server library.
//!
//! Turns a flat key/value configuration into a running HTTP service whose
//! endpoints share one repository, validator factory and JSON codec.

// Core subsystems
pub mod codec;
pub mod config;
pub mod graph;
pub mod http;
pub mod repository;
pub mod validation;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::Configuration;
pub use error::ServerError;
pub use graph::ServiceGraph;
pub use http::RepositoryServer;
pub use lifecycle::Shutdown;
