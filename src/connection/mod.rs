//! Connection actor serialising all work for one adaptor connection.
//!
//! The actor owns the [`Adaptor`] and is the only task that touches it. It
//! polls a shutdown token, activation requests, elapsed scheduled work and
//! core events using a `tokio::select!` loop. The `biased` keyword ensures
//! shutdown is observed first and that activation drains run before newer
//! core events. Because one task handles everything, a drain can never
//! overlap another drain or a callback for the same connection.

mod counter;
mod event;
mod handle;
mod state;

use std::{collections::HashMap, panic::AssertUnwindSafe};

pub use counter::active_connection_count;
use counter::ActiveConnection;
use event::Event;
pub use event::CoreEvent;
use futures::{FutureExt, StreamExt};
pub use handle::AdaptorHandle;
use log::info;
use state::ActorState;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::{
    sync::CancellationToken,
    task::TaskTracker,
    time::{DelayQueue, delay_queue},
};
use tracing::debug;

use crate::{
    activation::ActivationHandle,
    adaptor::Adaptor,
    core::RouterCore,
    protocol::ProtocolAdaptor,
    schedule::Work,
};

/// Actor driving one adaptor connection.
///
/// # Examples
///
/// ```rust,ignore
/// use tokio_util::sync::CancellationToken;
/// use linkwire::{Adaptor, ConnectionActor, config::AdaptorConfig};
///
/// let adaptor = Adaptor::new(core, AdaptorConfig::default());
/// let (actor, handle) = ConnectionActor::new(adaptor, CancellationToken::new());
/// let task = tokio::spawn(actor.run());
/// handle.activate();
/// ```
pub struct ConnectionActor<C: RouterCore> {
    adaptor: Adaptor<C>,
    events: mpsc::Receiver<CoreEvent>,
    activation: ActivationHandle,
    timers: DelayQueue<Work>,
    armed: HashMap<Work, delay_queue::Key>,
    shutdown: CancellationToken,
    counter: Option<ActiveConnection>,
}

impl<C: RouterCore> ConnectionActor<C> {
    /// Wrap `adaptor` in an actor and return the handle that feeds it.
    ///
    /// The event channel capacity comes from the adaptor's configuration.
    #[must_use]
    pub fn new(adaptor: Adaptor<C>, shutdown: CancellationToken) -> (Self, AdaptorHandle) {
        let (tx, rx) = mpsc::channel(adaptor.config().event_capacity.max(1));
        let activation = ActivationHandle::new();
        let handle = AdaptorHandle::new(tx, activation.clone());
        let actor = Self {
            adaptor,
            events: rx,
            activation,
            timers: DelayQueue::new(),
            armed: HashMap::new(),
            shutdown,
            counter: Some(ActiveConnection::new()),
        };
        (actor, handle)
    }

    /// Handle for activation requests to this actor.
    #[must_use]
    pub fn activation(&self) -> ActivationHandle { self.activation.clone() }

    /// Get a clone of the shutdown token used by the actor.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken { self.shutdown.clone() }

    /// The adaptor this actor serves.
    #[must_use]
    pub fn adaptor(&self) -> &Adaptor<C> { &self.adaptor }

    /// Spawn the actor on `tracker`, logging rather than propagating a panic.
    ///
    /// The task yields the adaptor back once the actor stops, or `None` if
    /// it panicked.
    pub fn spawn(self, tracker: &TaskTracker) -> JoinHandle<Option<Adaptor<C>>> {
        tracker.spawn(async move {
            match AssertUnwindSafe(self.run()).catch_unwind().await {
                Ok(adaptor) => Some(adaptor),
                Err(panic) => {
                    let panic_msg = panic
                        .downcast_ref::<&str>()
                        .copied()
                        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                        .unwrap_or("<non-string panic>");
                    tracing::error!(panic = %panic_msg, "connection actor panicked");
                    None
                }
            }
        })
    }

    /// Drive the actor until shutdown, or until every [`AdaptorHandle`] is
    /// dropped and no scheduled work remains.
    ///
    /// Returns the adaptor so the caller can finalise it.
    pub async fn run(mut self) -> Adaptor<C> {
        if self.shutdown.is_cancelled() {
            info!("connection actor aborted before start");
            let _ = self.counter.take();
            return self.adaptor;
        }

        info!(
            "connection actor started: linkwire_active_connections={}",
            counter::active_connection_count()
        );
        let mut state = ActorState::new();
        while state.is_running() {
            self.arm_timers();
            let event = self.next_event(&state).await;
            self.dispatch_event(event, &mut state);
            if state.is_draining() && self.is_quiescent() {
                state.finish();
            }
        }

        let uptime = self.counter.as_ref().map(ActiveConnection::uptime);
        info!(
            "connection actor stopped: connection={:?}, uptime={:?}",
            self.adaptor.connection(),
            uptime
        );
        let _ = self.counter.take();
        self.adaptor
    }

    /// Move newly requested work into the timer queue.
    ///
    /// Each kind of work has at most one timer. A new request for work that
    /// is already armed moves the existing deadline instead of adding a
    /// second timer.
    fn arm_timers(&mut self) {
        for scheduled in self.adaptor.take_scheduled() {
            if let Some(key) = self.armed.get(&scheduled.work) {
                debug!(work = ?scheduled.work, delay = ?scheduled.delay, "rescheduled armed timer");
                self.timers.reset(key, scheduled.delay);
            } else {
                let key = self.timers.insert(scheduled.work, scheduled.delay);
                self.armed.insert(scheduled.work, key);
            }
        }
    }

    /// Whether no scheduled work remains.
    fn is_quiescent(&self) -> bool { self.timers.is_empty() && !self.adaptor.has_scheduled() }

    /// Await the next ready event using biased priority ordering.
    ///
    /// Shutdown is observed first, followed by activation requests, elapsed
    /// timers and finally core events. The final `else` branch prevents
    /// `tokio::select!` from panicking if all guards are false.
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "tokio::select! expands to modulus operations internally"
    )]
    async fn next_event(&mut self, state: &ActorState) -> Event {
        let has_timers = !self.timers.is_empty();
        let accepts_events = state.accepts_events();

        tokio::select! {
            biased;

            () = self.shutdown.cancelled() => Event::Shutdown,
            () = self.activation.activated() => Event::Activate,
            Some(expired) = self.timers.next(), if has_timers => Event::Timer(expired.into_inner()),
            res = self.events.recv(), if accepts_events => match res {
                Some(event) => Event::Core(event),
                None => Event::EventsClosed,
            },
            else => Event::Idle,
        }
    }

    fn dispatch_event(&mut self, event: Event, state: &mut ActorState) {
        match event {
            Event::Shutdown => {
                self.events.close();
                let discarded = self.timers.len();
                self.timers.clear();
                self.armed.clear();
                info!("connection actor shutting down: discarded_timers={discarded}");
                state.finish();
            }
            Event::Activate => {
                // Requests made before this wake-up are served by the same drain.
                if self.activation.absorb_pending() {
                    debug!("coalesced activation requests");
                }
                match self.adaptor.connection() {
                    Some(connection) => self.adaptor.connection_activate(connection),
                    None => debug!("activation before connection opened ignored"),
                }
            }
            Event::Timer(work) => {
                self.armed.remove(&work);
                self.adaptor.run_work(work);
            }
            Event::Core(event) => event.dispatch(&mut self.adaptor),
            Event::EventsClosed => state.close_events(),
            Event::Idle => state.finish(),
        }
    }
}
