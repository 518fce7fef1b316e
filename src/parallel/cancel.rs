//! Cooperative cancellation shared by a session handle and its scheduler

use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable cancellation flag
///
/// Once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve when the token is cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this only returns once cancelled
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}
