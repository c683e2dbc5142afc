//! Tests for diagnostics the adaptor logs through the `log` facade.

use bytes::Bytes;
use linkwire::{
    AdaptorConfig,
    Delivery,
    DeliveryId,
    Disposition,
    LinkId,
    Message,
    ProtocolAdaptor,
    Section,
    Terminus,
};
use linkwire_testing::{LoggerHandle, attached, logger, started};
use rstest::rstest;
use serial_test::serial;

fn any_contains(records: &[String], needle: &str) -> bool {
    records.iter().any(|r| r.contains(needle))
}

#[rstest]
#[serial(adaptor_logs)]
fn rejected_outcome_logs_warning(mut logger: LoggerHandle) {
    logger.clear();
    let (mut adaptor, core) = attached(AdaptorConfig::default());
    adaptor.flow(adaptor.links().simple_send.expect("simple link"), 1);
    let delivery = core.created()[0].clone();

    adaptor.delivery_update(&delivery, Disposition::Rejected, true);

    let warnings = logger.drain_level(log::Level::Warn);
    assert!(
        any_contains(&warnings, "delivery not accepted"),
        "missing warning in {warnings:?}"
    );
}

#[rstest]
#[serial(adaptor_logs)]
fn accepted_outcome_does_not_warn(mut logger: LoggerHandle) {
    logger.clear();
    let (mut adaptor, core) = attached(AdaptorConfig::default());
    adaptor.flow(adaptor.links().simple_send.expect("simple link"), 1);
    let delivery = core.created()[0].clone();

    adaptor.delivery_update(&delivery, Disposition::Accepted, true);

    let warnings = logger.drain_level(log::Level::Warn);
    assert!(
        !any_contains(&warnings, "delivery not accepted"),
        "unexpected warning in {warnings:?}"
    );
}

#[rstest]
#[serial(adaptor_logs)]
fn complete_inbound_body_is_logged(mut logger: LoggerHandle) {
    logger.clear();
    let (mut adaptor, _core) = attached(AdaptorConfig::default());
    let link = adaptor.links().stream_receive.expect("receive link");
    let message = Message::compose(
        vec![Section::Data],
        [Bytes::from_static(b"hello world")],
        true,
    );
    let _ = adaptor.deliver(link, &Delivery::new(DeliveryId::new(3), link, message), false);

    let infos = logger.drain_level(log::Level::Info);
    assert!(any_contains(&infos, "complete message received"), "{infos:?}");
    assert!(any_contains(&infos, "hello world"), "{infos:?}");
}

#[rstest]
#[serial(adaptor_logs)]
fn reply_attach_without_address_warns(mut logger: LoggerHandle) {
    logger.clear();
    let (mut adaptor, _core) = started(AdaptorConfig::default());
    let link = adaptor.links().dynamic_reply.expect("reply link");
    adaptor.second_attach(link, Some(&Terminus::dynamic()), None);

    let warnings = logger.drain_level(log::Level::Warn);
    assert!(
        any_contains(&warnings, "attached without an address"),
        "{warnings:?}"
    );
}

#[rstest]
#[serial(adaptor_logs)]
fn credit_on_unknown_link_attempts_no_send(mut logger: LoggerHandle) {
    logger.clear();
    let (mut adaptor, _core) = started(AdaptorConfig::default());
    adaptor.flow(LinkId::new(77), 1);

    let warnings = logger.drain_level(log::Level::Warn);
    assert!(
        !any_contains(&warnings, "reply address not yet known"),
        "unknown links never attempt a send: {warnings:?}"
    );
}
