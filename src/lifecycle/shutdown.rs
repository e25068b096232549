//! Shutdown coordination for a running server.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// Backed by a watch channel so a signal taken after the trigger still
/// observes it. Dropping the coordinator also releases every signal.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Take a signal that resolves once shutdown is triggered.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of outstanding signals (tasks still waiting).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves when its [`Shutdown`] is triggered or dropped.
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub async fn recv(mut self) {
        // Err means the coordinator is gone, which also ends the server.
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}
