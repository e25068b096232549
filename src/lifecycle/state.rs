//! Server lifecycle states.
//!
//! ```text
//! Created ──start──▶ Running ──stop──▶ Stopped
//!    └────────────stop────────────────────┘
//! ```
//!
//! `Stopped` is terminal. `start` is only valid from `Created`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Router and graph built, nothing listening.
    Created,
    /// Accepting connections.
    Running,
    /// Listener released.
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Created => "created",
            LifecycleState::Running => "running",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}
