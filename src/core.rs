//! Calls the adaptor issues into the router core.
//!
//! The core owns canonical connection, link and delivery records. The
//! adaptor only ever reaches them through [`RouterCore`], which keeps the
//! routing engine, buffer pool and transport out of this crate.

use serde::{Deserialize, Serialize};

use crate::{
    delivery::DeliveryRef,
    ids::{ConnectionId, DeliveryId, LinkId},
    message::Message,
    terminus::Terminus,
};

/// Direction of a link, from the adaptor's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkDirection {
    /// The adaptor sends messages into the core.
    Outbound,
    /// The adaptor receives messages from the core.
    Inbound,
}

/// Role a connection plays towards the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionRole {
    #[default]
    Normal,
    InterRouter,
    RouteContainer,
}

/// Security and identity metadata reported when opening a connection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub is_encrypted: bool,
    pub is_authenticated: bool,
    pub opened: bool,
    pub sasl_mechanisms: String,
    pub incoming: bool,
    pub host: String,
    pub ssl_proto: String,
    pub ssl_cipher: String,
    pub user: String,
    pub container: String,
    pub ssl_ssf: u32,
    pub ssl: bool,
}

impl ConnectionInfo {
    /// Identity of an unauthenticated, unencrypted, already-open connection
    /// labelled with `container`.
    #[must_use]
    pub fn unauthenticated(container: &str) -> Self {
        Self {
            opened: true,
            incoming: true,
            container: container.to_owned(),
            ..Self::default()
        }
    }
}

/// Connection-level options passed to the core alongside [`ConnectionInfo`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    pub incoming: bool,
    pub role: ConnectionRole,
    pub cost: u32,
    pub strip_annotations_in: bool,
    pub strip_annotations_out: bool,
    pub allow_dynamic_link_routes: bool,
    pub allow_admin_status_update: bool,
    /// Credit window the core may extend per link.
    pub link_capacity: u32,
}

impl ConnectionOptions {
    /// Options for a plain incoming connection with the given link capacity.
    #[must_use]
    pub fn incoming(link_capacity: u32) -> Self {
        Self {
            incoming: true,
            role: ConnectionRole::Normal,
            cost: 1,
            strip_annotations_in: false,
            strip_annotations_out: false,
            allow_dynamic_link_routes: false,
            allow_admin_status_update: false,
            link_capacity,
        }
    }
}

/// Operations the core exposes to a protocol adaptor.
///
/// Every method is invoked from the adaptor's serialised execution context,
/// so implementations never see two calls for the same connection at once.
pub trait RouterCore: Send + 'static {
    /// Open a logical connection and return its identity.
    fn open_connection(&mut self, info: ConnectionInfo, options: ConnectionOptions)
    -> ConnectionId;

    /// Begin attaching a link on `connection`.
    fn attach_link(
        &mut self,
        connection: ConnectionId,
        direction: LinkDirection,
        source: Terminus,
        target: Terminus,
        name: &str,
    ) -> LinkId;

    /// Hand `message` to the core as a new delivery on `link`.
    ///
    /// The returned reference is the adaptor's single counted handle on the
    /// delivery.
    fn deliver(&mut self, link: LinkId, message: Message, settled: bool) -> DeliveryRef;

    /// Tell the core that more of the delivery's message is available.
    fn continue_delivery(&mut self, delivery: DeliveryId, settled: bool);

    /// Issue `credit` further units of flow on an inbound link.
    fn link_flow(&mut self, link: LinkId, credit: u32, drain: bool);

    /// Drop one counted reference on a delivery.
    ///
    /// Only [`DeliveryRef::release`] should call this.
    fn decref_delivery(&mut self, delivery: DeliveryId, label: &'static str);

    /// Let the core push up to `limit` pending deliveries on `link`.
    fn process_deliveries(&mut self, link: LinkId, limit: usize) -> usize;

    /// Produce pending protocol work; returns `true` while more remains.
    fn process_connection(&mut self, connection: ConnectionId) -> bool;

    /// Remove the adaptor's registration at teardown.
    fn deregister_adaptor(&mut self, name: &str);
}
