//! Helpers that drive an [`Adaptor`] synchronously, without an actor.

use linkwire::{Adaptor, AdaptorConfig, ProtocolAdaptor, RouterCore, Scheduled, Terminus};

use crate::RecordingCore;

/// Address the fake peer assigns to the dynamic reply link.
pub const REPLY_ADDRESS: &str = "amqp://peer/replies";

/// Run every zero-delay work item until none remain.
///
/// Returns the delayed items, which are left for the caller to run.
pub fn run_ready<C: RouterCore>(adaptor: &mut Adaptor<C>) -> Vec<Scheduled> {
    let mut delayed = Vec::new();
    loop {
        let (ready, later): (Vec<_>, Vec<_>) = adaptor
            .take_scheduled()
            .into_iter()
            .partition(|s| s.delay.is_zero());
        delayed.extend(later);
        if ready.is_empty() {
            return delayed;
        }
        for scheduled in ready {
            adaptor.run_work(scheduled.work);
        }
    }
}

/// An adaptor whose startup work has run.
#[must_use]
pub fn started(config: AdaptorConfig) -> (Adaptor<RecordingCore>, RecordingCore) {
    let core = RecordingCore::new();
    let mut adaptor = Adaptor::new(core.clone(), config);
    let delayed = run_ready(&mut adaptor);
    assert!(delayed.is_empty(), "startup scheduled delayed work");
    (adaptor, core)
}

/// An adaptor that has learned [`REPLY_ADDRESS`] and attached its send and
/// receive links.
#[must_use]
pub fn attached(config: AdaptorConfig) -> (Adaptor<RecordingCore>, RecordingCore) {
    let (mut adaptor, core) = started(config);
    let link = adaptor
        .links()
        .dynamic_reply
        .expect("dynamic reply link attached at startup");
    let source = Terminus::dynamic().assigned(REPLY_ADDRESS);
    adaptor.second_attach(link, Some(&source), Some(&Terminus::anonymous()));
    (adaptor, core)
}
