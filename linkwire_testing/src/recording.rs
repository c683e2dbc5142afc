//! In-memory [`RouterCore`] that records every call made into it.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use linkwire::{
    ConnectionId,
    ConnectionInfo,
    ConnectionOptions,
    Delivery,
    DeliveryId,
    DeliveryRef,
    LinkDirection,
    LinkId,
    Message,
    RouterCore,
    Terminus,
};

/// One call the adaptor made into the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreCall {
    OpenConnection {
        connection: ConnectionId,
        info: ConnectionInfo,
        options: ConnectionOptions,
    },
    AttachLink {
        connection: ConnectionId,
        link: LinkId,
        direction: LinkDirection,
        source: Terminus,
        target: Terminus,
        name: String,
    },
    Deliver {
        link: LinkId,
        delivery: DeliveryId,
        settled: bool,
    },
    ContinueDelivery {
        delivery: DeliveryId,
        settled: bool,
    },
    LinkFlow {
        link: LinkId,
        credit: u32,
        drain: bool,
    },
    DecrefDelivery {
        delivery: DeliveryId,
        label: &'static str,
    },
    ProcessDeliveries {
        link: LinkId,
        limit: usize,
    },
    ProcessConnection {
        connection: ConnectionId,
    },
    DeregisterAdaptor {
        name: String,
    },
}

#[derive(Default)]
struct Recorded {
    calls: Vec<CoreCall>,
    next_connection: u64,
    next_link: u64,
    next_delivery: u64,
    deliveries: HashMap<DeliveryId, Delivery>,
    released: HashSet<DeliveryId>,
    pending_rounds: usize,
    available: usize,
}

/// Fake core assigning sequential identities and recording calls.
///
/// Clones share state, so a test can keep one clone while the adaptor owns
/// another.
///
/// # Panics
///
/// [`RouterCore::decref_delivery`] panics if a delivery the core never
/// created is released, or if any delivery is released twice.
#[derive(Clone, Default)]
pub struct RecordingCore {
    state: Arc<Mutex<Recorded>>,
}

impl RecordingCore {
    /// Create an empty core.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    fn state(&self) -> MutexGuard<'_, Recorded> { self.state.lock().expect("core state poisoned") }

    /// Every call recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<CoreCall> { self.state().calls.clone() }

    /// Forget the recorded calls, keeping deliveries and counters.
    pub fn clear_calls(&self) { self.state().calls.clear(); }

    /// Link attaches in order.
    #[must_use]
    pub fn attaches(&self) -> Vec<CoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, CoreCall::AttachLink { .. }))
            .collect()
    }

    /// Credit grants in order, as `(link, credit)`.
    #[must_use]
    pub fn flows(&self) -> Vec<(LinkId, u32)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                CoreCall::LinkFlow { link, credit, .. } => Some((link, credit)),
                _ => None,
            })
            .collect()
    }

    /// Number of continuation signals for `delivery`.
    #[must_use]
    pub fn continuations(&self, delivery: DeliveryId) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, CoreCall::ContinueDelivery { delivery: d, .. } if *d == delivery))
            .count()
    }

    /// Number of `process_connection` calls.
    #[must_use]
    pub fn process_rounds(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, CoreCall::ProcessConnection { .. }))
            .count()
    }

    /// Deliveries created by the adaptor, in creation order.
    #[must_use]
    pub fn created(&self) -> Vec<Delivery> {
        let state = self.state();
        let mut deliveries: Vec<_> = state.deliveries.values().cloned().collect();
        deliveries.sort_by_key(|d| d.id().as_u64());
        deliveries
    }

    /// Delivery created with identity `id`.
    #[must_use]
    pub fn delivery(&self, id: DeliveryId) -> Option<Delivery> {
        self.state().deliveries.get(&id).cloned()
    }

    /// Number of times `delivery` was released.
    #[must_use]
    pub fn release_count(&self, delivery: DeliveryId) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, CoreCall::DecrefDelivery { delivery: d, .. } if *d == delivery))
            .count()
    }

    /// Whether the adaptor deregistered under `name`.
    #[must_use]
    pub fn deregistered(&self, name: &str) -> bool {
        self.calls()
            .iter()
            .any(|c| matches!(c, CoreCall::DeregisterAdaptor { name: n } if n == name))
    }

    /// Make the next `rounds` calls to `process_connection` report work.
    pub fn queue_rounds(&self, rounds: usize) { self.state().pending_rounds += rounds; }

    /// Number of deliveries `process_deliveries` may hand out.
    pub fn set_available(&self, available: usize) { self.state().available = available; }
}

impl RouterCore for RecordingCore {
    fn open_connection(
        &mut self,
        info: ConnectionInfo,
        options: ConnectionOptions,
    ) -> ConnectionId {
        let mut state = self.state();
        state.next_connection += 1;
        let connection = ConnectionId::new(state.next_connection);
        state.calls.push(CoreCall::OpenConnection {
            connection,
            info,
            options,
        });
        connection
    }

    fn attach_link(
        &mut self,
        connection: ConnectionId,
        direction: LinkDirection,
        source: Terminus,
        target: Terminus,
        name: &str,
    ) -> LinkId {
        let mut state = self.state();
        state.next_link += 1;
        let link = LinkId::new(state.next_link);
        state.calls.push(CoreCall::AttachLink {
            connection,
            link,
            direction,
            source,
            target,
            name: name.to_owned(),
        });
        link
    }

    fn deliver(&mut self, link: LinkId, message: Message, settled: bool) -> DeliveryRef {
        let mut state = self.state();
        state.next_delivery += 1;
        let id = DeliveryId::new(state.next_delivery);
        let delivery = Delivery::new(id, link, message);
        state.deliveries.insert(id, delivery.clone());
        state.calls.push(CoreCall::Deliver {
            link,
            delivery: id,
            settled,
        });
        DeliveryRef::new(delivery)
    }

    fn continue_delivery(&mut self, delivery: DeliveryId, settled: bool) {
        self.state()
            .calls
            .push(CoreCall::ContinueDelivery { delivery, settled });
    }

    fn link_flow(&mut self, link: LinkId, credit: u32, drain: bool) {
        self.state().calls.push(CoreCall::LinkFlow {
            link,
            credit,
            drain,
        });
    }

    fn decref_delivery(&mut self, delivery: DeliveryId, label: &'static str) {
        let mut state = self.state();
        assert!(
            state.deliveries.contains_key(&delivery),
            "released unknown delivery {delivery}"
        );
        assert!(
            state.released.insert(delivery),
            "delivery {delivery} released twice"
        );
        state
            .calls
            .push(CoreCall::DecrefDelivery { delivery, label });
    }

    fn process_deliveries(&mut self, link: LinkId, limit: usize) -> usize {
        let mut state = self.state();
        state
            .calls
            .push(CoreCall::ProcessDeliveries { link, limit });
        let processed = limit.min(state.available);
        state.available -= processed;
        processed
    }

    fn process_connection(&mut self, connection: ConnectionId) -> bool {
        let mut state = self.state();
        state
            .calls
            .push(CoreCall::ProcessConnection { connection });
        if state.pending_rounds == 0 {
            return false;
        }
        state.pending_rounds -= 1;
        true
    }

    fn deregister_adaptor(&mut self, name: &str) {
        self.state().calls.push(CoreCall::DeregisterAdaptor {
            name: name.to_owned(),
        });
    }
}
