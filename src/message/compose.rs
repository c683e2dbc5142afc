//! Composition of the messages the adaptor originates.

use bytes::Bytes;

use super::{Message, Properties, Section};

/// Encoded `amqp-value` section carrying the string `"Test Payload"`.
pub const TEST_PAYLOAD_SECTION: &[u8] = b"\x00\x53\x77\xa1\x0cTest Payload";

/// Body of a streaming message before any chunk is appended.
pub const STREAM_BODY_PLACEHOLDER: &[u8] = b"";

/// Properties with only `reply-to` populated.
#[must_use]
pub fn reply_properties(reply_to: &str) -> Properties {
    Properties {
        reply_to: Some(reply_to.to_owned()),
        ..Properties::default()
    }
}

/// A complete one-shot message with a fixed short body.
#[must_use]
pub fn one_shot(reply_to: &str) -> Message {
    Message::compose(
        vec![Section::Properties(reply_properties(reply_to)), Section::AmqpValue],
        [Bytes::from_static(TEST_PAYLOAD_SECTION)],
        true,
    )
}

/// Properties plus an empty `data` section, left open for extension.
#[must_use]
pub fn streaming(reply_to: &str) -> Message {
    Message::compose(
        vec![Section::Properties(reply_properties(reply_to)), Section::Data],
        [Bytes::from_static(STREAM_BODY_PLACEHOLDER)],
        false,
    )
}
