//! The link-and-delivery state machine.
//!
//! [`Adaptor`] owns the adaptor's single connection, its four links, the
//! learned reply-to address, the streaming session and every delivery
//! reference it holds. The core drives it through [`ProtocolAdaptor`];
//! deferred work is queued in a [`Schedule`] and run back through
//! [`Adaptor::run_work`] by whoever drives the adaptor.

mod attach;
mod flow;
mod inbound;
mod outcome;
mod stream;

use bytes::Bytes;
pub use stream::{StreamPhase, StreamingSession};
use tracing::{debug, info, warn};

use crate::{
    config::{AdaptorConfig, ConfigError},
    core::{ConnectionInfo, ConnectionOptions, LinkDirection, RouterCore},
    delivery::{Delivery, DeliveryTracker},
    disposition::Disposition,
    ids::{ConnectionId, LinkId},
    protocol::ProtocolAdaptor,
    schedule::{Schedule, Scheduled, Work},
    terminus::{self, Terminus},
};

/// What the adaptor uses a link for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkRole {
    /// Inbound link with a dynamic source, used to learn the reply address.
    DynamicReply,
    /// Outbound link carrying one-shot messages.
    SimpleSend,
    /// Outbound link carrying streamed messages.
    StreamSend,
    /// Inbound link subscribed to the stream address.
    StreamReceive,
}

/// Identities of the links the adaptor has attached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Links {
    pub dynamic_reply: Option<LinkId>,
    pub simple_send: Option<LinkId>,
    pub stream_send: Option<LinkId>,
    pub stream_receive: Option<LinkId>,
}

impl Links {
    /// Role of `link`, if it is one of the adaptor's links.
    #[must_use]
    pub fn role_of(&self, link: LinkId) -> Option<LinkRole> {
        let link = Some(link);
        if link == self.dynamic_reply {
            Some(LinkRole::DynamicReply)
        } else if link == self.simple_send {
            Some(LinkRole::SimpleSend)
        } else if link == self.stream_send {
            Some(LinkRole::StreamSend)
        } else if link == self.stream_receive {
            Some(LinkRole::StreamReceive)
        } else {
            None
        }
    }

    /// Number of links attached so far.
    #[must_use]
    pub fn count(&self) -> usize {
        [
            self.dynamic_reply,
            self.simple_send,
            self.stream_send,
            self.stream_receive,
        ]
        .iter()
        .flatten()
        .count()
    }
}

/// Protocol adaptor state for one registration.
///
/// # Examples
///
/// ```rust,ignore
/// use linkwire::{Adaptor, config::AdaptorConfig, schedule::Work};
///
/// let mut adaptor = Adaptor::new(core, AdaptorConfig::default());
/// for scheduled in adaptor.take_scheduled() {
///     adaptor.run_work(scheduled.work);
/// }
/// assert!(adaptor.connection().is_some());
/// ```
pub struct Adaptor<C> {
    core: C,
    config: AdaptorConfig,
    chunk: Bytes,
    connection: Option<ConnectionId>,
    closed: bool,
    trace: bool,
    links: Links,
    reply_to: Option<String>,
    stream: StreamingSession,
    deliveries: DeliveryTracker,
    schedule: Schedule,
}

impl<C: RouterCore> Adaptor<C> {
    /// Register a new adaptor over `core`.
    ///
    /// Bootstrap does not run here: a zero-delay [`Work::Startup`] is
    /// scheduled instead. A zero chunk bound is raised to one so a streamed
    /// body always holds exactly `stream_chunk_bound` chunks; use
    /// [`Adaptor::try_new`] to reject such a configuration instead.
    #[must_use]
    pub fn new(core: C, mut config: AdaptorConfig) -> Self {
        if config.stream_chunk_bound == 0 {
            warn!("stream chunk bound of zero raised to one");
            config.stream_chunk_bound = 1;
        }
        let chunk = Bytes::from(config.stream_chunk.clone().into_bytes());
        let mut schedule = Schedule::default();
        schedule.schedule(Work::Startup, std::time::Duration::ZERO);
        Self {
            core,
            config,
            chunk,
            connection: None,
            closed: false,
            trace: false,
            links: Links::default(),
            reply_to: None,
            stream: StreamingSession::default(),
            deliveries: DeliveryTracker::default(),
            schedule,
        }
    }

    /// Validate `config` and register a new adaptor.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`AdaptorConfig::validate`].
    pub fn try_new(core: C, config: AdaptorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(core, config))
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &AdaptorConfig { &self.config }

    /// The core this adaptor talks to.
    #[must_use]
    pub fn core(&self) -> &C { &self.core }

    /// Mutable access to the core.
    pub fn core_mut(&mut self) -> &mut C { &mut self.core }

    /// Connection opened at startup, once bootstrap has run.
    #[must_use]
    pub fn connection(&self) -> Option<ConnectionId> { self.connection }

    /// Whether the core has closed the connection.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.closed }

    /// Whether frame tracing was requested for the connection.
    #[must_use]
    pub fn is_tracing(&self) -> bool { self.trace }

    /// Links attached so far.
    #[must_use]
    pub fn links(&self) -> Links { self.links }

    /// Reply address learned from the dynamic link.
    #[must_use]
    pub fn reply_to(&self) -> Option<&str> { self.reply_to.as_deref() }

    /// Current streaming session.
    #[must_use]
    pub fn stream(&self) -> &StreamingSession { &self.stream }

    /// Delivery references currently held.
    #[must_use]
    pub fn deliveries(&self) -> &DeliveryTracker { &self.deliveries }

    /// Whether `work` is waiting to be taken.
    #[must_use]
    pub fn is_scheduled(&self, work: Work) -> bool { self.schedule.is_pending(work) }

    /// Whether any deferred work is waiting to be taken.
    #[must_use]
    pub fn has_scheduled(&self) -> bool { !self.schedule.is_empty() }

    /// Remove and return the deferred work requested so far.
    pub fn take_scheduled(&mut self) -> Vec<Scheduled> { self.schedule.take() }

    /// Run one item of deferred work.
    pub fn run_work(&mut self, work: Work) {
        match work {
            Work::Startup => self.start(),
            Work::Activate => {
                self.drain_connection();
            }
            Work::StreamProgress => self.stream_progress(),
        }
    }

    /// Open the connection and attach the dynamic reply link.
    fn start(&mut self) {
        if self.connection.is_some() {
            warn!("adaptor already started; ignoring startup");
            return;
        }
        let info = ConnectionInfo::unauthenticated(&self.config.container);
        let options = ConnectionOptions::incoming(self.config.link_capacity);
        let connection = self.core.open_connection(info, options);
        self.connection = Some(connection);

        let link = self.core.attach_link(
            connection,
            LinkDirection::Inbound,
            Terminus::dynamic(),
            Terminus::anonymous(),
            &self.config.link_name(0),
        );
        self.links.dynamic_reply = Some(link);
        info!(
            %connection,
            %link,
            container = %self.config.container,
            "adaptor connection opened"
        );
    }

    /// Process the connection until the core reports no more work.
    ///
    /// Returns the number of rounds that produced work.
    fn drain_connection(&mut self) -> usize {
        let Some(connection) = self.connection else {
            debug!("activation before startup; nothing to drain");
            return 0;
        };
        if self.closed {
            debug!(%connection, "activation on closed connection ignored");
            return 0;
        }
        let mut rounds = 0;
        while self.core.process_connection(connection) {
            rounds += 1;
        }
        debug!(%connection, rounds, "connection drained");
        rounds
    }

    /// Tear the adaptor down and hand back the core.
    ///
    /// Unsettled delivery references are abandoned rather than released:
    /// release happens only on observed settlement.
    pub fn finalize(mut self) -> C {
        let outstanding = self.deliveries.abandon_all();
        if outstanding > 0 {
            warn!(outstanding, "finalising adaptor with unsettled deliveries");
        }
        self.reply_to = None;
        self.stream.reset();
        self.core.deregister_adaptor(&self.config.adaptor_name);
        info!(adaptor = %self.config.adaptor_name, "adaptor finalised");
        self.core
    }
}

impl<C: RouterCore> ProtocolAdaptor for Adaptor<C> {
    fn connection_activate(&mut self, connection: ConnectionId) {
        if !self
            .schedule
            .schedule(Work::Activate, std::time::Duration::ZERO)
        {
            debug!(%connection, "activation already pending");
        }
    }

    fn first_attach(
        &mut self,
        connection: ConnectionId,
        link: LinkId,
        source: Option<&Terminus>,
        target: Option<&Terminus>,
    ) {
        debug!(
            %connection,
            %link,
            source = %terminus::describe(source),
            target = %terminus::describe(target),
            "peer-initiated attach ignored"
        );
    }

    fn second_attach(&mut self, link: LinkId, source: Option<&Terminus>, target: Option<&Terminus>) {
        self.handle_second_attach(link, source, target);
    }

    fn detach(&mut self, link: LinkId, error: Option<&str>, first: bool, close: bool) {
        info!(%link, ?error, first, close, role = ?self.links.role_of(link), "link detached");
    }

    fn flow(&mut self, link: LinkId, credit: i32) { self.handle_flow(link, credit); }

    fn push(&mut self, link: LinkId, limit: usize) -> usize {
        let processed = self.core.process_deliveries(link, limit);
        debug!(%link, limit, processed, "push");
        processed
    }

    fn deliver(&mut self, link: LinkId, delivery: &Delivery, settled: bool) -> Option<Disposition> {
        self.handle_deliver(link, delivery, settled)
    }

    fn get_credit(&self, _link: LinkId) -> u32 { self.config.credit_window }

    fn delivery_update(&mut self, delivery: &Delivery, disposition: Disposition, settled: bool) {
        self.handle_delivery_update(delivery, disposition, settled);
    }

    fn connection_close(&mut self, connection: ConnectionId, error: Option<&str>) {
        if Some(connection) == self.connection {
            self.closed = true;
        }
        match error {
            Some(error) => warn!(%connection, error, "connection closed with error"),
            None => info!(%connection, "connection closed"),
        }
    }

    fn connection_trace(&mut self, connection: ConnectionId, trace: bool) {
        debug!(%connection, trace, "connection trace toggled");
        self.trace = trace;
    }
}
