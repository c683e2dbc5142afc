//! Incrementally built application messages.
//!
//! A [`Message`] is shared between the adaptor and the core: the adaptor may
//! keep a clone while the core transfers it. Sections arrive in order as the
//! decoder makes progress, and body buffers may be appended until the message
//! is marked receive-complete. [`Message::check_depth`] reports how far
//! decoding has progressed without waiting for the whole message.

mod compose;

use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
    PoisonError,
    atomic::{AtomicU64, Ordering},
};

use bytes::{Bytes, BytesMut};
pub use compose::{STREAM_BODY_PLACEHOLDER, TEST_PAYLOAD_SECTION, one_shot, reply_properties, streaming};
use thiserror::Error;

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(u64);

impl MessageId {
    fn next() -> Self { Self(NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed)) }

    /// Return the inner `u64` representation.
    #[must_use]
    pub fn as_u64(&self) -> u64 { self.0 }
}

/// How much message structure a caller requires before inspecting it.
///
/// Variants are ordered as the sections appear on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Depth {
    None,
    Header,
    DeliveryAnnotations,
    MessageAnnotations,
    Properties,
    ApplicationProperties,
    Body,
    Footer,
}

/// Result of [`Message::check_depth`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthStatus {
    /// Every section up to the requested depth has been decoded.
    Ok,
    /// More bytes are needed before the requested depth is known.
    Incomplete,
    /// The decoder found malformed framing.
    Invalid,
}

/// The properties section, restricted to the fields the adaptor composes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Properties {
    pub message_id: Option<String>,
    pub user_id: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub reply_to: Option<String>,
}

impl Properties {
    /// Positional list form, as the fields are encoded on the wire.
    ///
    /// ```
    /// use linkwire::message::Properties;
    ///
    /// let props = Properties {
    ///     reply_to: Some("amqp://peer/replies".into()),
    ///     ..Properties::default()
    /// };
    /// assert_eq!(
    ///     props.as_list(),
    ///     vec![None, None, None, None, Some("amqp://peer/replies".to_owned())]
    /// );
    /// ```
    #[must_use]
    pub fn as_list(&self) -> Vec<Option<String>> {
        vec![
            self.message_id.clone(),
            self.user_id.clone(),
            self.to.clone(),
            self.subject.clone(),
            self.reply_to.clone(),
        ]
    }
}

/// A decoded message section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Section {
    Header,
    DeliveryAnnotations,
    MessageAnnotations,
    Properties(Properties),
    ApplicationProperties,
    /// Body carried as one or more `data` sections.
    Data,
    /// Body carried as a single `amqp-value` section.
    AmqpValue,
    Footer,
}

impl Section {
    /// Depth reached once this section has been decoded.
    #[must_use]
    pub fn depth(&self) -> Depth {
        match self {
            Self::Header => Depth::Header,
            Self::DeliveryAnnotations => Depth::DeliveryAnnotations,
            Self::MessageAnnotations => Depth::MessageAnnotations,
            Self::Properties(_) => Depth::Properties,
            Self::ApplicationProperties => Depth::ApplicationProperties,
            Self::Data | Self::AmqpValue => Depth::Body,
            Self::Footer => Depth::Footer,
        }
    }
}

/// Errors raised when mutating a message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MessageError {
    /// The message was already marked receive-complete.
    #[error("message {0:?} is receive-complete and cannot be extended")]
    ReceiveComplete(MessageId),
    /// A section arrived out of wire order.
    #[error("section at depth {found:?} follows depth {reached:?}")]
    OutOfOrder {
        /// Depth already reached.
        reached: Depth,
        /// Depth of the rejected section.
        found: Depth,
    },
}

#[derive(Debug, Default)]
struct MessageState {
    sections: Vec<Section>,
    body: Vec<Bytes>,
    receive_complete: bool,
    send_complete: bool,
    invalid: bool,
}

impl MessageState {
    fn depth(&self) -> Depth { self.sections.last().map_or(Depth::None, Section::depth) }
}

#[derive(Debug)]
struct MessageInner {
    id: MessageId,
    state: Mutex<MessageState>,
}

/// Shared handle to an application message.
///
/// Cloning the handle does not copy the message; both clones observe the
/// same sections, buffers and completion flags.
#[derive(Clone, Debug)]
pub struct Message(Arc<MessageInner>);

impl Default for Message {
    fn default() -> Self { Self::new() }
}

impl Message {
    /// Create an empty, receive-incomplete message.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(MessageInner {
            id: MessageId::next(),
            state: Mutex::new(MessageState::default()),
        }))
    }

    /// Build a message from pre-composed sections and body buffers.
    #[must_use]
    pub fn compose(
        sections: Vec<Section>,
        body: impl IntoIterator<Item = Bytes>,
        receive_complete: bool,
    ) -> Self {
        let message = Self::new();
        {
            let mut state = message.state();
            state.sections = sections;
            state.body = body.into_iter().filter(|b| !b.is_empty()).collect();
            state.receive_complete = receive_complete;
        }
        message
    }

    fn state(&self) -> MutexGuard<'_, MessageState> {
        self.0.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identity of this message.
    #[must_use]
    pub fn id(&self) -> MessageId { self.0.id }

    /// Whether `other` refers to the same underlying message.
    #[must_use]
    pub fn is_same(&self, other: &Message) -> bool { Arc::ptr_eq(&self.0, &other.0) }

    /// Record a newly decoded section.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::ReceiveComplete`] once the message is complete
    /// and [`MessageError::OutOfOrder`] if `section` precedes the depth
    /// already reached.
    pub fn push_section(&self, section: Section) -> Result<Depth, MessageError> {
        let mut state = self.state();
        if state.receive_complete {
            return Err(MessageError::ReceiveComplete(self.id()));
        }
        let reached = state.depth();
        let found = section.depth();
        // Repeated data sections are legal; anything else must move forward.
        if found < reached || (found == reached && found != Depth::Body) {
            return Err(MessageError::OutOfOrder { reached, found });
        }
        state.sections.push(section);
        Ok(found)
    }

    /// Append body buffers, returning the depth reached so far.
    ///
    /// Empty buffers are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::ReceiveComplete`] if the message was already
    /// marked receive-complete.
    pub fn extend(&self, buffers: impl IntoIterator<Item = Bytes>) -> Result<Depth, MessageError> {
        let mut state = self.state();
        if state.receive_complete {
            return Err(MessageError::ReceiveComplete(self.id()));
        }
        state.body.extend(buffers.into_iter().filter(|b| !b.is_empty()));
        Ok(state.depth())
    }

    /// Flag the message as structurally invalid.
    pub fn mark_invalid(&self) { self.state().invalid = true; }

    /// Report whether decoding has reached `depth`.
    ///
    /// A complete message that lacks the requested section is reported as
    /// [`DepthStatus::Ok`]: nothing more will arrive.
    #[must_use]
    pub fn check_depth(&self, depth: Depth) -> DepthStatus {
        let state = self.state();
        if state.invalid {
            DepthStatus::Invalid
        } else if state.depth() >= depth || state.receive_complete {
            DepthStatus::Ok
        } else {
            DepthStatus::Incomplete
        }
    }

    /// Mark that no more bytes will arrive.
    pub fn set_receive_complete(&self) { self.state().receive_complete = true; }

    /// Whether every byte that will ever arrive has arrived.
    #[must_use]
    pub fn is_receive_complete(&self) -> bool { self.state().receive_complete }

    /// Mark that every byte has been handed onward.
    pub fn set_send_complete(&self) { self.state().send_complete = true; }

    /// Whether every byte has been handed onward.
    #[must_use]
    pub fn is_send_complete(&self) -> bool { self.state().send_complete }

    /// Properties section, if decoded.
    #[must_use]
    pub fn properties(&self) -> Option<Properties> {
        self.state().sections.iter().find_map(|s| match s {
            Section::Properties(p) => Some(p.clone()),
            _ => None,
        })
    }

    /// Copy of the decoded sections.
    #[must_use]
    pub fn sections(&self) -> Vec<Section> { self.state().sections.clone() }

    /// Number of body buffers held.
    #[must_use]
    pub fn body_buffer_count(&self) -> usize { self.state().body.len() }

    /// Total body length in bytes.
    #[must_use]
    pub fn body_len(&self) -> usize { self.state().body.iter().map(Bytes::len).sum() }

    /// Contiguous copy of the body.
    #[must_use]
    pub fn body(&self) -> Bytes {
        let state = self.state();
        let mut out = BytesMut::with_capacity(state.body.iter().map(Bytes::len).sum());
        for buf in &state.body {
            out.extend_from_slice(buf);
        }
        out.freeze()
    }

    /// Body rendered as lossy UTF-8 for diagnostics.
    #[must_use]
    pub fn body_text(&self) -> String { String::from_utf8_lossy(&self.body()).into_owned() }
}

#[cfg(test)]
mod tests;
