//! Write-once stop condition shared between the signal listener, the
//! coordinator and (optionally) the main task.

use std::sync::Arc;
use tokio::sync::watch;

/// A termination request that has been observed.
///
/// Cheap to clone; every clone observes the same flag. Once set it is never
/// unset.
#[derive(Clone, Debug)]
pub struct StopCondition {
    tx: Arc<watch::Sender<bool>>,
}

impl StopCondition {
    /// Create an unset stop condition.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Set the condition.
    ///
    /// Returns `true` only for the call that actually flipped the flag.
    pub fn set(&self) -> bool {
        self.tx.send_if_modified(|set| {
            if *set {
                false
            } else {
                *set = true;
                true
            }
        })
    }

    /// Check whether a termination request has been observed.
    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the condition is set. Returns immediately if already set.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|set| *set).await;
    }
}

impl Default for StopCondition {
    fn default() -> Self {
        Self::new()
    }
}
