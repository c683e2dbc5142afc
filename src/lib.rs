#![doc(html_root_url = "https://docs.rs/linkwire/latest")]
//! Public API for the `linkwire` library.
//!
//! This crate provides a protocol adaptor for a message router core: a
//! link-and-delivery state machine that opens one connection, learns a
//! reply address from a dynamically-addressed link, sends one-shot and
//! streamed messages into the core, accepts inbound messages once they are
//! complete and releases each delivery reference exactly once on
//! settlement. A [`ConnectionActor`] serialises all callbacks and deferred
//! work for the adaptor's connection on one task.

pub mod activation;
pub mod adaptor;
pub mod config;
pub mod connection;
pub mod core;
pub mod delivery;
pub mod disposition;
pub mod error;
pub mod ids;
pub mod message;
pub mod metrics;
pub mod protocol;
pub mod schedule;
pub mod terminus;

pub use activation::ActivationHandle;
pub use adaptor::{Adaptor, LinkRole, Links, StreamPhase, StreamingSession};
pub use config::{AdaptorConfig, AdaptorConfigBuilder, ConfigError, CreditPolicy};
pub use connection::{AdaptorHandle, ConnectionActor, CoreEvent, active_connection_count};
pub use crate::core::{ConnectionInfo, ConnectionOptions, ConnectionRole, LinkDirection, RouterCore};
pub use delivery::{Delivery, DeliveryRef, DeliveryTracker};
pub use disposition::Disposition;
pub use error::{AdaptorError, Result};
pub use ids::{ConnectionId, DeliveryId, LinkId};
pub use message::{Depth, DepthStatus, Message, MessageError, Properties, Section};
pub use metrics::{
    CONNECTIONS_ACTIVE,
    DELIVERIES_TOTAL,
    INVALID_MESSAGES_TOTAL,
    SETTLEMENTS_TOTAL,
    STREAM_CHUNKS_TOTAL,
};
pub use protocol::ProtocolAdaptor;
pub use schedule::{Schedule, Scheduled, Work};
pub use terminus::Terminus;
