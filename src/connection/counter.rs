//! Count of running connection actors.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

static RUNNING_ACTORS: AtomicU64 = AtomicU64::new(0);

/// Guard held for as long as one connection actor runs.
///
/// Creation bumps the process-wide count and the connections gauge; drop
/// reverses both.
pub(super) struct ActiveConnection {
    started: Instant,
}

impl ActiveConnection {
    pub(super) fn new() -> Self {
        RUNNING_ACTORS.fetch_add(1, Ordering::Relaxed);
        crate::metrics::inc_connections();
        Self {
            started: Instant::now(),
        }
    }

    /// Time since the actor started.
    pub(super) fn uptime(&self) -> Duration { self.started.elapsed() }
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        RUNNING_ACTORS.fetch_sub(1, Ordering::Relaxed);
        crate::metrics::dec_connections();
    }
}

/// Number of connection actors currently running in this process.
#[must_use]
pub fn active_connection_count() -> u64 { RUNNING_ACTORS.load(Ordering::Relaxed) }
