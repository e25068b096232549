//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Third-party crates logging through `log`:
//!     → bridge.rs (optional, flag-controlled) → tracing
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event
//! - Bridge installation is best effort and never fatal

pub mod bridge;
pub mod logging;
pub mod metrics;
