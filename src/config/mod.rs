//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults.rs (process-wide default table)
//!     + caller overrides (map, or loader.rs reading a TOML file)
//!     → overlay.rs (copy defaults, copy overrides on top)
//!     → Configuration (effective, immutable)
//!     → shared via Arc to the service graph and handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once built; a new server instance gets a new one
//! - The overlay never validates; consumers parse the keys they read and
//!   report the offending key when they reject a value

pub mod defaults;
pub mod error;
pub mod loader;
pub mod overlay;

pub use error::ConfigError;
pub use overlay::Configuration;
