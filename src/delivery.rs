//! Delivery views and the adaptor's counted delivery handles.
//!
//! The core hands the adaptor a [`Delivery`] view with every delivery event.
//! When the adaptor creates a delivery it additionally receives a
//! [`DeliveryRef`], the single counted handle it owns until settlement.
//! `DeliveryRef::release` consumes the handle, so a second release does not
//! compile; [`DeliveryTracker`] ensures the handle is found at most once.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    core::RouterCore,
    ids::{DeliveryId, LinkId},
    message::Message,
};

/// One transfer attempt of one message over one link.
#[derive(Clone, Debug)]
pub struct Delivery {
    id: DeliveryId,
    link: LinkId,
    message: Message,
}

impl Delivery {
    /// Describe a delivery known to the core.
    #[must_use]
    pub fn new(id: DeliveryId, link: LinkId, message: Message) -> Self { Self { id, link, message } }

    /// Core-assigned identity.
    #[must_use]
    pub fn id(&self) -> DeliveryId { self.id }

    /// Link the delivery travels on.
    #[must_use]
    pub fn link(&self) -> LinkId { self.link }

    /// Message being transferred.
    #[must_use]
    pub fn message(&self) -> &Message { &self.message }
}

/// Counted handle on a delivery held by the adaptor.
///
/// Dropping an unreleased handle leaks the core's reference; a warning is
/// logged when that happens.
#[must_use = "delivery references must be released once the delivery settles"]
#[derive(Debug)]
pub struct DeliveryRef {
    delivery: Delivery,
    armed: bool,
}

impl DeliveryRef {
    /// Wrap the core's reference on `delivery`.
    pub fn new(delivery: Delivery) -> Self {
        Self {
            delivery,
            armed: true,
        }
    }

    /// The referenced delivery.
    #[must_use]
    pub fn delivery(&self) -> &Delivery { &self.delivery }

    /// Core-assigned identity.
    #[must_use]
    pub fn id(&self) -> DeliveryId { self.delivery.id }

    /// Give the reference back to the core.
    pub fn release<C: RouterCore + ?Sized>(mut self, core: &mut C, label: &'static str) {
        self.armed = false;
        debug!(delivery = %self.delivery.id, label, "releasing delivery reference");
        core.decref_delivery(self.delivery.id, label);
    }

    /// Forget the reference without returning it to the core.
    fn abandon(mut self) {
        self.armed = false;
        warn!(delivery = %self.delivery.id, "abandoning unsettled delivery reference");
    }
}

impl Drop for DeliveryRef {
    fn drop(&mut self) {
        if self.armed {
            warn!(delivery = %self.delivery.id, "delivery reference dropped without release");
        }
    }
}

/// Deliveries the adaptor holds a reference on, keyed by identity.
#[derive(Debug, Default)]
pub struct DeliveryTracker(HashMap<DeliveryId, DeliveryRef>);

impl DeliveryTracker {
    /// Start tracking a reference.
    ///
    /// Returns `false` and keeps the existing entry if the identity is
    /// already tracked; the duplicate handle is abandoned.
    pub fn track(&mut self, reference: DeliveryRef) -> bool {
        let id = reference.id();
        if self.0.contains_key(&id) {
            warn!(delivery = %id, "delivery already tracked");
            reference.abandon();
            return false;
        }
        self.0.insert(id, reference);
        true
    }

    /// Whether a reference on `id` is held.
    #[must_use]
    pub fn contains(&self, id: DeliveryId) -> bool { self.0.contains_key(&id) }

    /// Look up a held reference.
    #[must_use]
    pub fn get(&self, id: DeliveryId) -> Option<&DeliveryRef> { self.0.get(&id) }

    /// Number of held references.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether no references are held.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Release the reference on `id`, if held.
    ///
    /// Returns `true` when a reference was released.
    pub fn release<C: RouterCore + ?Sized>(
        &mut self,
        id: DeliveryId,
        core: &mut C,
        label: &'static str,
    ) -> bool {
        match self.0.remove(&id) {
            Some(reference) => {
                reference.release(core, label);
                true
            }
            None => false,
        }
    }

    /// Forget every held reference, returning how many were outstanding.
    pub fn abandon_all(&mut self) -> usize {
        let count = self.0.len();
        for (_, reference) in self.0.drain() {
            reference.abandon();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::{
        core::{ConnectionInfo, ConnectionOptions, LinkDirection},
        ids::ConnectionId,
        terminus::Terminus,
    };

    #[derive(Default)]
    struct DecrefLog(Vec<(DeliveryId, &'static str)>);

    impl RouterCore for DecrefLog {
        fn open_connection(&mut self, _: ConnectionInfo, _: ConnectionOptions) -> ConnectionId {
            ConnectionId::new(1)
        }

        fn attach_link(
            &mut self,
            _: ConnectionId,
            _: LinkDirection,
            _: Terminus,
            _: Terminus,
            _: &str,
        ) -> LinkId {
            LinkId::new(1)
        }

        fn deliver(&mut self, link: LinkId, message: Message, _: bool) -> DeliveryRef {
            DeliveryRef::new(Delivery::new(DeliveryId::new(1), link, message))
        }

        fn continue_delivery(&mut self, _: DeliveryId, _: bool) {}

        fn link_flow(&mut self, _: LinkId, _: u32, _: bool) {}

        fn decref_delivery(&mut self, delivery: DeliveryId, label: &'static str) {
            self.0.push((delivery, label));
        }

        fn process_deliveries(&mut self, _: LinkId, _: usize) -> usize { 0 }

        fn process_connection(&mut self, _: ConnectionId) -> bool { false }

        fn deregister_adaptor(&mut self, _: &str) {}
    }

    fn reference(id: u64) -> DeliveryRef {
        DeliveryRef::new(Delivery::new(DeliveryId::new(id), LinkId::new(1), Message::new()))
    }

    #[test]
    fn tracked_reference_is_released_once() {
        let mut core = DecrefLog::default();
        let mut tracker = DeliveryTracker::default();
        assert!(tracker.track(reference(5)));

        assert!(tracker.release(DeliveryId::new(5), &mut core, "settled"));
        assert!(!tracker.release(DeliveryId::new(5), &mut core, "settled"));
        assert_eq!(core.0, vec![(DeliveryId::new(5), "settled")]);
        assert!(tracker.is_empty());
    }

    #[traced_test]
    #[test]
    fn duplicate_tracking_keeps_first_reference() {
        let mut tracker = DeliveryTracker::default();
        let first = reference(6);
        let message = first.delivery().message().clone();
        assert!(tracker.track(first));
        assert!(!tracker.track(reference(6)));

        assert_eq!(tracker.len(), 1);
        let held = tracker.get(DeliveryId::new(6)).expect("tracked");
        assert!(held.delivery().message().is_same(&message));
        assert!(logs_contain("delivery already tracked"));
        assert_eq!(tracker.abandon_all(), 1);
    }

    #[traced_test]
    #[test]
    fn dropping_unreleased_reference_warns() {
        drop(reference(7));
        assert!(logs_contain("delivery reference dropped without release"));
    }

    #[traced_test]
    #[test]
    fn abandoned_references_do_not_warn_on_drop() {
        let mut tracker = DeliveryTracker::default();
        assert!(tracker.track(reference(8)));
        assert_eq!(tracker.abandon_all(), 1);
        assert!(!logs_contain("dropped without release"));
    }
}
