//! Property-based checks over random sequences of core events.
//!
//! Whatever order credit, streaming ticks and delivery updates arrive in,
//! each delivery reference is released at most once, settled deliveries are
//! never held afterwards and streamed bodies stay consistent with their
//! chunk count.

use linkwire::{AdaptorConfig, Disposition, ProtocolAdaptor, StreamPhase, Work};
use linkwire_testing::attached;
use proptest::prelude::*;

const CHUNK_LEN: usize = 62;

#[derive(Debug, Clone)]
enum Action {
    SimpleCredit(i32),
    StreamCredit,
    Tick,
    Update {
        index: usize,
        disposition: u64,
        settled: bool,
    },
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        (-2..4_i32).prop_map(Action::SimpleCredit),
        Just(Action::StreamCredit),
        Just(Action::Tick),
        (0..8_usize, 0x24..0x29_u64, any::<bool>()).prop_map(|(index, disposition, settled)| {
            Action::Update {
                index,
                disposition,
                settled,
            }
        }),
    ]
}

proptest! {
    #[test]
    fn references_are_released_at_most_once(actions in proptest::collection::vec(action(), 0..40)) {
        let (mut adaptor, core) = attached(AdaptorConfig::default());
        let links = adaptor.links();
        let simple = links.simple_send.expect("simple link");
        let stream = links.stream_send.expect("stream link");

        for act in &actions {
            match *act {
                Action::SimpleCredit(credit) => adaptor.flow(simple, credit),
                Action::StreamCredit => adaptor.flow(stream, 1),
                Action::Tick => adaptor.run_work(Work::StreamProgress),
                Action::Update { index, disposition, settled } => {
                    let created = core.created();
                    if let Some(delivery) = created.get(index) {
                        adaptor.delivery_update(delivery, Disposition::from_code(disposition), settled);
                        if settled {
                            prop_assert!(!adaptor.deliveries().contains(delivery.id()));
                        }
                    }
                }
            }

            let session = adaptor.stream();
            if let Some(message) = session.message() {
                prop_assert_eq!(message.body_len(), session.chunks() as usize * CHUNK_LEN);
                prop_assert!(!message.is_receive_complete());
            }
            if session.phase() == StreamPhase::Complete {
                prop_assert_eq!(session.chunks(), adaptor.config().stream_chunk_bound);
            }
        }

        for delivery in core.created() {
            prop_assert!(core.release_count(delivery.id()) <= 1);
            let held = adaptor.deliveries().contains(delivery.id());
            let released = core.release_count(delivery.id()) == 1;
            prop_assert!(held != released, "delivery {} both held and released, or neither", delivery.id());
        }
    }
}
