//! Incrementally streamed outbound messages.
//!
//! A streaming send starts with a message holding only properties and an
//! empty body. Each [`Work::StreamProgress`] tick appends one fixed chunk and
//! tells the core the delivery has more data, until the configured number of
//! chunks has been appended and the message is marked receive-complete.

use tracing::{debug, info, warn};

use super::Adaptor;
use crate::{
    core::RouterCore,
    ids::{DeliveryId, LinkId},
    message::{self, Message},
    metrics::{self, Direction},
    schedule::Work,
};

/// Phase of the streaming state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
    /// No streaming message is set.
    Idle,
    /// A message is set and chunks are still being appended.
    Streaming,
    /// Every chunk was appended; the delivery awaits settlement.
    Complete,
}

/// Adaptor-local state of the in-flight streamed message.
#[derive(Debug, Default)]
pub struct StreamingSession {
    message: Option<Message>,
    delivery: Option<DeliveryId>,
    chunks: u32,
}

impl StreamingSession {
    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> StreamPhase {
        match (&self.message, self.delivery) {
            (Some(_), _) => StreamPhase::Streaming,
            (None, Some(_)) => StreamPhase::Complete,
            (None, None) => StreamPhase::Idle,
        }
    }

    /// Whether chunks are still being appended.
    #[must_use]
    pub fn is_streaming(&self) -> bool { self.message.is_some() }

    /// Message being streamed, while streaming.
    #[must_use]
    pub fn message(&self) -> Option<&Message> { self.message.as_ref() }

    /// Delivery carrying the streamed message, until it settles.
    #[must_use]
    pub fn delivery(&self) -> Option<DeliveryId> { self.delivery }

    /// Chunks appended so far.
    #[must_use]
    pub fn chunks(&self) -> u32 { self.chunks }

    /// Whether `message` is the message currently being streamed.
    #[must_use]
    pub fn is_recorded(&self, message: &Message) -> bool {
        self.message.as_ref().is_some_and(|m| m.is_same(message))
    }

    fn begin(&mut self, message: Message, delivery: DeliveryId) {
        self.message = Some(message);
        self.delivery = Some(delivery);
        self.chunks = 0;
    }

    fn record_chunk(&mut self) -> u32 {
        self.chunks += 1;
        self.chunks
    }

    fn complete(&mut self) { self.message = None; }

    /// Return to [`StreamPhase::Idle`].
    pub(super) fn reset(&mut self) {
        self.message = None;
        self.delivery = None;
        self.chunks = 0;
    }
}

impl<C: RouterCore> Adaptor<C> {
    /// Start a streamed delivery on `link`.
    pub(super) fn begin_stream(&mut self, link: LinkId) {
        if self.stream.is_streaming() {
            debug!(%link, "streaming delivery already in progress");
            return;
        }
        let Some(reply_to) = self.reply_to.as_deref() else {
            warn!(%link, "reply address not yet known; stream not started");
            return;
        };

        let message = message::streaming(reply_to);
        let reference = self.core.deliver(link, message.clone(), false);
        info!(%link, delivery = %reference.id(), "starting a streaming delivery");
        self.stream.begin(message, reference.id());
        self.deliveries.track(reference);
        metrics::inc_deliveries(Direction::Outbound);
        self.schedule
            .schedule(Work::StreamProgress, self.config.stream_start_delay);
    }

    /// Append the next chunk to the streaming message.
    ///
    /// A tick that finds no streaming message is a no-op: the session may
    /// have completed or been cleared by a delivery update after the tick
    /// was scheduled.
    pub(super) fn stream_progress(&mut self) {
        let (Some(message), Some(delivery)) = (self.stream.message().cloned(), self.stream.delivery())
        else {
            debug!("no streaming message; progress tick ignored");
            return;
        };

        let depth = match message.extend([self.chunk.clone()]) {
            Ok(depth) => depth,
            Err(error) => {
                warn!(%error, %delivery, "streaming message cannot be extended");
                self.stream.complete();
                return;
            }
        };
        self.core.continue_delivery(delivery, false);
        let sent = self.stream.record_chunk();
        metrics::inc_stream_chunks();

        if sent < self.config.stream_chunk_bound {
            self.schedule
                .schedule(Work::StreamProgress, self.config.stream_interval);
            debug!(%delivery, chunk = sent, ?depth, "sent streamed chunk");
        } else {
            message.set_receive_complete();
            self.stream.complete();
            info!(%delivery, chunks = sent, ?depth, "completed streaming send");
        }
    }
}
