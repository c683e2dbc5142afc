//! The callback table a protocol adaptor registers with the core.
//!
//! [`ProtocolAdaptor`] has one method per core event. The core guarantees
//! that no two calls for the same connection overlap, so every method takes
//! `&mut self`. Events an adaptor has no use for default to no-ops.

use crate::{
    delivery::Delivery,
    disposition::Disposition,
    ids::{ConnectionId, LinkId},
    terminus::Terminus,
};

/// Events the router core delivers to a protocol adaptor.
///
/// ```rust,ignore
/// use linkwire::{ProtocolAdaptor, ids::LinkId};
///
/// struct Sink;
///
/// impl ProtocolAdaptor for Sink {
///     fn connection_activate(&mut self, _connection: ConnectionId) {}
///     fn second_attach(&mut self, _link: LinkId, _s: Option<&Terminus>, _t: Option<&Terminus>) {}
///     fn flow(&mut self, _link: LinkId, _credit: i32) {}
///     fn push(&mut self, _link: LinkId, _limit: usize) -> usize { 0 }
///     fn deliver(&mut self, _link: LinkId, _d: &Delivery, _settled: bool) -> Option<Disposition> {
///         None
///     }
///     fn get_credit(&self, _link: LinkId) -> u32 { 1 }
///     fn delivery_update(&mut self, _d: &Delivery, _disp: Disposition, _settled: bool) {}
/// }
/// ```
pub trait ProtocolAdaptor {
    /// The connection has outbound protocol work pending.
    ///
    /// May be signalled from a context that must not run connection work
    /// itself; implementations defer the drain.
    fn connection_activate(&mut self, connection: ConnectionId);

    /// The peer began attaching a link.
    fn first_attach(
        &mut self,
        _connection: ConnectionId,
        _link: LinkId,
        _source: Option<&Terminus>,
        _target: Option<&Terminus>,
    ) {
    }

    /// A link the adaptor began attaching has completed its attach.
    fn second_attach(&mut self, link: LinkId, source: Option<&Terminus>, target: Option<&Terminus>);

    /// A link was detached.
    fn detach(&mut self, _link: LinkId, _error: Option<&str>, _first: bool, _close: bool) {}

    /// The core granted `credit` on an outbound link.
    fn flow(&mut self, link: LinkId, credit: i32);

    /// The core has `delivery_count` deliveries available on a link.
    fn offer(&mut self, _link: LinkId, _delivery_count: i32) {}

    /// A drain on the link completed.
    fn drained(&mut self, _link: LinkId) {}

    /// The core changed drain mode on the link.
    fn drain(&mut self, _link: LinkId, _mode: bool) {}

    /// The core asks the adaptor to pull up to `limit` deliveries.
    ///
    /// Returns the number processed.
    fn push(&mut self, link: LinkId, limit: usize) -> usize;

    /// Application data arrived on an inbound link.
    ///
    /// Returning `Some` decides the delivery's outcome; `None` leaves it
    /// undecided and the core re-invokes this method as more data arrives.
    fn deliver(&mut self, link: LinkId, delivery: &Delivery, settled: bool)
    -> Option<Disposition>;

    /// Credit the adaptor is willing to extend on `link`.
    fn get_credit(&self, link: LinkId) -> u32;

    /// A delivery's disposition or settlement changed.
    fn delivery_update(&mut self, delivery: &Delivery, disposition: Disposition, settled: bool);

    /// The core closed the connection.
    fn connection_close(&mut self, _connection: ConnectionId, _error: Option<&str>) {}

    /// The core toggled frame tracing on the connection.
    fn connection_trace(&mut self, _connection: ConnectionId, _trace: bool) {}
}
