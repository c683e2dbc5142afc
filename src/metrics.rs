//! Metric helpers for `linkwire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. With the
//! `metrics` feature disabled every helper is a no-op.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

use crate::disposition::Disposition;

/// Name of the gauge tracking running connection actors.
pub const CONNECTIONS_ACTIVE: &str = "linkwire_connections_active";
/// Name of the counter tracking deliveries created or consumed.
pub const DELIVERIES_TOTAL: &str = "linkwire_deliveries_total";
/// Name of the counter tracking streamed chunks.
pub const STREAM_CHUNKS_TOTAL: &str = "linkwire_stream_chunks_total";
/// Name of the counter tracking observed settlements by outcome.
pub const SETTLEMENTS_TOTAL: &str = "linkwire_settlements_total";
/// Name of the counter tracking inbound messages with invalid framing.
pub const INVALID_MESSAGES_TOTAL: &str = "linkwire_invalid_messages_total";

/// Direction of a delivery relative to the adaptor.
#[derive(Clone, Copy)]
pub enum Direction {
    /// Deliveries consumed from the core.
    Inbound,
    /// Deliveries handed to the core.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Increment the active connections gauge.
pub fn inc_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).increment(1.0);
}

/// Decrement the active connections gauge.
pub fn dec_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).decrement(1.0);
}

/// Record a delivery for the given direction.
pub fn inc_deliveries(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(DELIVERIES_TOTAL, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record one streamed chunk.
pub fn inc_stream_chunks() {
    #[cfg(feature = "metrics")]
    counter!(STREAM_CHUNKS_TOTAL).increment(1);
}

/// Record a settlement observed with `outcome`.
pub fn inc_settlements(outcome: Disposition) {
    #[cfg(feature = "metrics")]
    counter!(SETTLEMENTS_TOTAL, "outcome" => outcome.name()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = outcome;
}

/// Record an inbound message that failed structural validation.
pub fn inc_invalid_messages() {
    #[cfg(feature = "metrics")]
    counter!(INVALID_MESSAGES_TOTAL).increment(1);
}
