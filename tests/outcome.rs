//! Tests for disposition handling and exactly-once release of deliveries.

use linkwire::{
    AdaptorConfig,
    Delivery,
    DeliveryId,
    Disposition,
    Message,
    ProtocolAdaptor,
    StreamPhase,
    Work,
};
use linkwire_testing::{CoreCall, attached};
use rstest::rstest;

#[rstest]
#[case(Disposition::Accepted)]
#[case(Disposition::Rejected)]
#[case(Disposition::Released)]
#[case(Disposition::Modified)]
#[case(Disposition::Unknown(0x99))]
fn settlement_releases_reference_exactly_once(#[case] disposition: Disposition) {
    let (mut adaptor, core) = attached(AdaptorConfig::default());
    let link = adaptor.links().simple_send.expect("simple link");
    adaptor.flow(link, 1);
    let delivery = core.created()[0].clone();

    adaptor.delivery_update(&delivery, disposition, true);
    adaptor.delivery_update(&delivery, disposition, true);

    assert_eq!(core.release_count(delivery.id()), 1);
    assert!(adaptor.deliveries().is_empty());
    assert!(core.calls().contains(&CoreCall::DecrefDelivery {
        delivery: delivery.id(),
        label: "delivery_update - settled delivery",
    }));
}

#[test]
fn unsettled_update_keeps_reference() {
    let (mut adaptor, core) = attached(AdaptorConfig::default());
    let link = adaptor.links().simple_send.expect("simple link");
    adaptor.flow(link, 1);
    let delivery = core.created()[0].clone();

    adaptor.delivery_update(&delivery, Disposition::Accepted, false);

    assert_eq!(core.release_count(delivery.id()), 0);
    assert!(adaptor.deliveries().contains(delivery.id()));

    adaptor.delivery_update(&delivery, Disposition::Accepted, true);
    assert_eq!(core.release_count(delivery.id()), 1);
}

#[test]
fn untracked_delivery_update_is_ignored() {
    let (mut adaptor, core) = attached(AdaptorConfig::default());
    let link = adaptor.links().stream_receive.expect("receive link");
    let stranger = Delivery::new(DeliveryId::new(77), link, Message::new());

    adaptor.delivery_update(&stranger, Disposition::Rejected, true);

    assert_eq!(core.release_count(stranger.id()), 0);
}

#[test]
fn other_delivery_update_leaves_stream_untouched() {
    let (mut adaptor, core) = attached(AdaptorConfig::default());
    let links = adaptor.links();
    adaptor.flow(links.stream_send.expect("stream link"), 1);
    adaptor.flow(links.simple_send.expect("simple link"), 1);
    adaptor.run_work(Work::StreamProgress);
    let created = core.created();
    let (streamed, simple) = (&created[0], &created[1]);

    adaptor.delivery_update(simple, Disposition::Accepted, true);

    assert_eq!(adaptor.stream().phase(), StreamPhase::Streaming);
    assert_eq!(adaptor.stream().delivery(), Some(streamed.id()));
    assert_eq!(adaptor.stream().chunks(), 1);
    assert_eq!(core.release_count(simple.id()), 1);
    assert_eq!(core.release_count(streamed.id()), 0);
    assert_eq!(adaptor.deliveries().len(), 1);
}

#[test]
fn unsettled_update_for_streaming_delivery_abandons_stream() {
    let (mut adaptor, core) = attached(AdaptorConfig::default());
    adaptor.flow(adaptor.links().stream_send.expect("stream link"), 1);
    let delivery = core.created()[0].clone();
    adaptor.run_work(Work::StreamProgress);

    adaptor.delivery_update(&delivery, Disposition::Released, false);

    assert_eq!(adaptor.stream().phase(), StreamPhase::Idle);
    assert!(adaptor.deliveries().contains(delivery.id()));

    adaptor.run_work(Work::StreamProgress);
    assert_eq!(core.continuations(delivery.id()), 1);

    adaptor.delivery_update(&delivery, Disposition::Released, true);
    assert_eq!(core.release_count(delivery.id()), 1);
}

#[test]
fn settlement_after_stream_completes_resets_session() {
    let config = AdaptorConfig::builder()
        .stream_chunk_bound(1)
        .build()
        .expect("valid config");
    let (mut adaptor, core) = attached(config);
    adaptor.flow(adaptor.links().stream_send.expect("stream link"), 1);
    let delivery = core.created()[0].clone();
    adaptor.run_work(Work::StreamProgress);
    assert_eq!(adaptor.stream().phase(), StreamPhase::Complete);

    adaptor.delivery_update(&delivery, Disposition::Accepted, true);

    assert_eq!(adaptor.stream().phase(), StreamPhase::Idle);
    assert_eq!(core.release_count(delivery.id()), 1);
}

#[test]
fn finalize_abandons_unsettled_references() {
    let (mut adaptor, core) = attached(AdaptorConfig::default());
    adaptor.flow(adaptor.links().simple_send.expect("simple link"), 1);
    let delivery = core.created()[0].clone();

    let _core = adaptor.finalize();

    assert_eq!(core.release_count(delivery.id()), 0);
    assert!(core.deregistered("reference"));
}
