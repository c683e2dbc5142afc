//! Actor lifecycle state management.

/// Internal run state for the connection actor.
#[derive(Debug)]
pub(super) enum RunState {
    /// Core events and timers are being processed.
    Active,
    /// No more core events will arrive; outstanding timers still run.
    Draining,
    /// The actor can exit.
    Finished,
}

/// Tracks progress through the actor lifecycle.
#[derive(Debug)]
pub(super) struct ActorState {
    run_state: RunState,
}

impl ActorState {
    pub(super) fn new() -> Self {
        Self {
            run_state: RunState::Active,
        }
    }

    /// Record that the event channel has closed.
    pub(super) fn close_events(&mut self) {
        if matches!(self.run_state, RunState::Active) {
            self.run_state = RunState::Draining;
        }
    }

    /// Mark the actor finished.
    pub(super) fn finish(&mut self) { self.run_state = RunState::Finished; }

    /// Returns `true` while core events may still arrive.
    pub(super) fn accepts_events(&self) -> bool { matches!(self.run_state, RunState::Active) }

    /// Returns `true` until the actor has finished.
    pub(super) fn is_running(&self) -> bool { !self.is_done() }

    /// Returns `true` once the core event channel has closed.
    pub(super) fn is_draining(&self) -> bool { matches!(self.run_state, RunState::Draining) }

    /// Returns `true` when the actor can exit.
    pub(super) fn is_done(&self) -> bool { matches!(self.run_state, RunState::Finished) }
}
