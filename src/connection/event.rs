//! Events flowing into the connection actor.

use tokio::sync::oneshot;

use crate::{
    delivery::Delivery,
    disposition::Disposition,
    ids::{ConnectionId, LinkId},
    protocol::ProtocolAdaptor,
    schedule::Work,
    terminus::Terminus,
};

/// A core callback, carried to the connection actor.
///
/// Callbacks that return a value carry a reply channel; the answer is sent
/// once the adaptor has handled the event.
#[derive(Debug)]
pub enum CoreEvent {
    FirstAttach {
        connection: ConnectionId,
        link: LinkId,
        source: Option<Terminus>,
        target: Option<Terminus>,
    },
    SecondAttach {
        link: LinkId,
        source: Option<Terminus>,
        target: Option<Terminus>,
    },
    Detach {
        link: LinkId,
        error: Option<String>,
        first: bool,
        close: bool,
    },
    Flow {
        link: LinkId,
        credit: i32,
    },
    Offer {
        link: LinkId,
        delivery_count: i32,
    },
    Drained {
        link: LinkId,
    },
    Drain {
        link: LinkId,
        mode: bool,
    },
    Push {
        link: LinkId,
        limit: usize,
        reply: Option<oneshot::Sender<usize>>,
    },
    Deliver {
        link: LinkId,
        delivery: Delivery,
        settled: bool,
        reply: Option<oneshot::Sender<Option<Disposition>>>,
    },
    GetCredit {
        link: LinkId,
        reply: oneshot::Sender<u32>,
    },
    DeliveryUpdate {
        delivery: Delivery,
        disposition: Disposition,
        settled: bool,
    },
    ConnectionClose {
        connection: ConnectionId,
        error: Option<String>,
    },
    ConnectionTrace {
        connection: ConnectionId,
        trace: bool,
    },
}

impl CoreEvent {
    /// Invoke the matching callback on `adaptor` and answer any reply.
    ///
    /// A reply whose receiver has gone away is discarded.
    pub fn dispatch<A: ProtocolAdaptor + ?Sized>(self, adaptor: &mut A) {
        match self {
            Self::FirstAttach {
                connection,
                link,
                source,
                target,
            } => adaptor.first_attach(connection, link, source.as_ref(), target.as_ref()),
            Self::SecondAttach {
                link,
                source,
                target,
            } => adaptor.second_attach(link, source.as_ref(), target.as_ref()),
            Self::Detach {
                link,
                error,
                first,
                close,
            } => adaptor.detach(link, error.as_deref(), first, close),
            Self::Flow { link, credit } => adaptor.flow(link, credit),
            Self::Offer {
                link,
                delivery_count,
            } => adaptor.offer(link, delivery_count),
            Self::Drained { link } => adaptor.drained(link),
            Self::Drain { link, mode } => adaptor.drain(link, mode),
            Self::Push { link, limit, reply } => {
                let processed = adaptor.push(link, limit);
                if let Some(reply) = reply {
                    let _ = reply.send(processed);
                }
            }
            Self::Deliver {
                link,
                delivery,
                settled,
                reply,
            } => {
                let outcome = adaptor.deliver(link, &delivery, settled);
                if let Some(reply) = reply {
                    let _ = reply.send(outcome);
                }
            }
            Self::GetCredit { link, reply } => {
                let _ = reply.send(adaptor.get_credit(link));
            }
            Self::DeliveryUpdate {
                delivery,
                disposition,
                settled,
            } => adaptor.delivery_update(&delivery, disposition, settled),
            Self::ConnectionClose { connection, error } => {
                adaptor.connection_close(connection, error.as_deref());
            }
            Self::ConnectionTrace { connection, trace } => {
                adaptor.connection_trace(connection, trace);
            }
        }
    }
}

/// Events returned by [`ConnectionActor::next_event`][super::ConnectionActor::next_event].
#[derive(Debug)]
pub(super) enum Event {
    Shutdown,
    Activate,
    /// A scheduled work item whose delay has elapsed.
    Timer(Work),
    Core(CoreEvent),
    /// Every [`super::AdaptorHandle`] has been dropped.
    EventsClosed,
    Idle,
}
