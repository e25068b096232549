//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Install log bridge → Resolve listener settings → Compose service graph
//!
//! Server (http/server.rs, state.rs):
//!     Created → start → Running → stop → Stopped
//!
//! Shutdown (shutdown.rs):
//!     stop() → trigger → axum stops accepting → in-flight requests drain
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → binary calls stop()
//! ```
//!
//! # Design Decisions
//! - Ordered startup: bridge first, then config, then graph
//! - The listener is bound in `start`, never during construction
//! - Lifecycle misuse is an error, not a no-op

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use state::LifecycleState;
