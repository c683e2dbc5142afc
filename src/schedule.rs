//! Deferred work requested by the adaptor.
//!
//! The state machine never runs deferred work inline. It records a [`Work`]
//! item with a delay in its [`Schedule`], and whoever drives the adaptor (the
//! connection actor, or a test) takes the pending items and runs each one
//! back through [`crate::adaptor::Adaptor::run_work`] once its delay has
//! elapsed.

use std::{collections::VecDeque, time::Duration};

/// A unit of deferred adaptor work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Work {
    /// Open the connection and attach the dynamic reply link.
    Startup,
    /// Drain the core's pending protocol work for the connection.
    Activate,
    /// Append the next chunk to the streaming message.
    StreamProgress,
}

/// A work item paired with the delay after which it should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub work: Work,
    pub delay: Duration,
}

/// Pending deferred work, in request order.
///
/// Requests for work that is already pending are coalesced, so at most one
/// item of each [`Work`] kind waits here at a time.
#[derive(Debug, Default)]
pub struct Schedule {
    pending: VecDeque<Scheduled>,
}

impl Schedule {
    /// Request `work` after `delay`.
    ///
    /// Returns `false` when an identical request is already pending.
    pub fn schedule(&mut self, work: Work, delay: Duration) -> bool {
        if self.is_pending(work) {
            return false;
        }
        self.pending.push_back(Scheduled { work, delay });
        true
    }

    /// Whether `work` is waiting to be taken.
    #[must_use]
    pub fn is_pending(&self, work: Work) -> bool { self.pending.iter().any(|s| s.work == work) }

    /// Number of pending items.
    #[must_use]
    pub fn len(&self) -> usize { self.pending.len() }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    /// Remove and return every pending item.
    pub fn take(&mut self) -> Vec<Scheduled> { self.pending.drain(..).collect() }
}
