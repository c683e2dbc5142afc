//! Cross-thread activation requests for a connection.
//!
//! The core may report "this connection has work" from any thread. An
//! [`ActivationHandle`] turns those reports into at most one pending wake-up
//! for the connection actor, which then runs the drain on its own task. Any
//! number of requests made before the actor wakes collapse into one drain.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use futures::FutureExt;
use tokio::sync::Notify;
use tracing::trace;

/// Shared state behind [`ActivationHandle`].
#[derive(Debug, Default)]
struct ActivationInner {
    notify: Notify,
    requests: AtomicU64,
}

/// Cloneable handle used by the core to activate a connection.
#[derive(Clone, Debug, Default)]
pub struct ActivationHandle(Arc<ActivationInner>);

impl ActivationHandle {
    pub(crate) fn new() -> Self { Self::default() }

    /// Request a drain of the connection.
    ///
    /// Never blocks. If a wake-up is already pending this request is
    /// absorbed by it.
    pub fn activate(&self) {
        let total = self.0.requests.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(total, "activation requested");
        self.0.notify.notify_one();
    }

    /// Number of activation requests made through any clone of this handle.
    #[must_use]
    pub fn requests(&self) -> u64 { self.0.requests.load(Ordering::Relaxed) }

    /// Wait for the next pending activation.
    pub(crate) async fn activated(&self) { self.0.notify.notified().await; }

    /// Consume a wake-up stored while the previous one was being handled.
    ///
    /// Returns `true` if one was pending.
    pub(crate) fn absorb_pending(&self) -> bool { self.activated().now_or_never().is_some() }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn repeated_requests_collapse_into_one_wakeup() {
        let handle = ActivationHandle::new();
        handle.activate();
        handle.activate();
        handle.clone().activate();
        assert_eq!(handle.requests(), 3);

        timeout(Duration::from_millis(50), handle.activated())
            .await
            .expect("first wake-up is pending");
        assert!(
            timeout(Duration::from_millis(50), handle.activated())
                .await
                .is_err(),
            "requests made before the wake-up must not queue a second one"
        );
    }

    #[tokio::test]
    async fn absorbing_clears_a_stored_wakeup() {
        let handle = ActivationHandle::new();
        assert!(!handle.absorb_pending());
        handle.activate();
        assert!(handle.absorb_pending());
        assert!(!handle.absorb_pending());
    }
}
