//! Tests for the shared message model.

use bytes::Bytes;
use rstest::rstest;

use super::*;

#[test]
fn new_message_is_incomplete() {
    let msg = Message::new();
    assert_eq!(msg.check_depth(Depth::ApplicationProperties), DepthStatus::Incomplete);
    assert!(!msg.is_receive_complete());
    assert!(!msg.is_send_complete());
}

#[rstest]
#[case(Section::Header, DepthStatus::Incomplete)]
#[case(Section::Properties(Properties::default()), DepthStatus::Incomplete)]
#[case(Section::ApplicationProperties, DepthStatus::Ok)]
#[case(Section::Data, DepthStatus::Ok)]
fn depth_follows_deepest_section(#[case] section: Section, #[case] expected: DepthStatus) {
    let msg = Message::new();
    msg.push_section(section).expect("section accepted");
    assert_eq!(msg.check_depth(Depth::ApplicationProperties), expected);
}

#[test]
fn complete_message_without_section_is_ok() {
    let msg = Message::new();
    msg.push_section(Section::Header).expect("header accepted");
    msg.set_receive_complete();
    assert_eq!(msg.check_depth(Depth::ApplicationProperties), DepthStatus::Ok);
}

#[test]
fn invalid_overrides_progress() {
    let msg = Message::new();
    msg.push_section(Section::Data).expect("data accepted");
    msg.mark_invalid();
    assert_eq!(msg.check_depth(Depth::Header), DepthStatus::Invalid);
}

#[test]
fn sections_must_advance() {
    let msg = Message::new();
    msg.push_section(Section::ApplicationProperties)
        .expect("app properties accepted");
    let err = msg
        .push_section(Section::Header)
        .expect_err("header after app properties");
    assert_eq!(
        err,
        MessageError::OutOfOrder {
            reached: Depth::ApplicationProperties,
            found: Depth::Header,
        }
    );
    msg.push_section(Section::Data).expect("first data");
    msg.push_section(Section::Data).expect("repeated data");
}

#[test]
fn extend_appends_until_complete() {
    let msg = streaming("r");
    assert_eq!(msg.extend([Bytes::from_static(b"abc")]), Ok(Depth::Body));
    assert_eq!(msg.extend([Bytes::from_static(b"de")]), Ok(Depth::Body));
    assert_eq!(msg.body(), Bytes::from_static(b"abcde"));
    assert_eq!(msg.body_buffer_count(), 2);
    msg.set_receive_complete();
    assert_eq!(
        msg.extend([Bytes::from_static(b"x")]),
        Err(MessageError::ReceiveComplete(msg.id()))
    );
    assert_eq!(msg.body_len(), 5);
}

#[test]
fn clones_share_state() {
    let msg = Message::new();
    let other = msg.clone();
    other.set_send_complete();
    assert!(msg.is_send_complete());
    assert!(msg.is_same(&other));
    assert!(!msg.is_same(&Message::new()));
    assert_ne!(msg.id(), Message::new().id());
}

#[test]
fn one_shot_carries_reply_to_and_payload() {
    let msg = one_shot("amqp://peer/replies");
    assert!(msg.is_receive_complete());
    let props = msg.properties().expect("properties present");
    assert_eq!(
        props.as_list(),
        vec![None, None, None, None, Some("amqp://peer/replies".to_owned())]
    );
    assert_eq!(msg.body().as_ref(), TEST_PAYLOAD_SECTION);
    assert_eq!(TEST_PAYLOAD_SECTION.len(), 17);
}

#[test]
fn streaming_starts_open_with_empty_body() {
    let msg = streaming("reply");
    assert!(!msg.is_receive_complete());
    assert_eq!(msg.body_len(), 0);
    assert_eq!(msg.sections().last(), Some(&Section::Data));
}
