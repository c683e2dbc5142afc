//! Consumption of deliveries pushed to the adaptor.

use tracing::{debug, info, warn};

use super::Adaptor;
use crate::{
    core::RouterCore,
    delivery::Delivery,
    disposition::Disposition,
    ids::LinkId,
    message::{Depth, DepthStatus},
    metrics::{self, Direction},
};

impl<C: RouterCore> Adaptor<C> {
    /// Decide the outcome of an inbound delivery, if it can be decided yet.
    ///
    /// Only a message that is structurally valid through its application
    /// properties and fully received is accepted. Every other case returns
    /// `None`; this adaptor never rejects or releases.
    pub(super) fn handle_deliver(
        &mut self,
        link: LinkId,
        delivery: &Delivery,
        settled: bool,
    ) -> Option<Disposition> {
        let message = delivery.message();
        if message.is_send_complete() {
            debug!(%link, delivery = %delivery.id(), "delivery already consumed");
            return None;
        }

        match message.check_depth(Depth::ApplicationProperties) {
            DepthStatus::Invalid => {
                warn!(%link, delivery = %delivery.id(), settled, "message invalid");
                metrics::inc_invalid_messages();
                self.core.link_flow(link, 1, false);
                None
            }
            DepthStatus::Incomplete => {
                debug!(%link, delivery = %delivery.id(), "message incomplete");
                None
            }
            DepthStatus::Ok if !message.is_receive_complete() => {
                debug!(%link, delivery = %delivery.id(), "awaiting remainder of message");
                None
            }
            DepthStatus::Ok => {
                let body = message.body_text();
                info!(%link, delivery = %delivery.id(), %body, "complete message received");
                message.set_send_complete();
                self.core.link_flow(link, 1, false);
                metrics::inc_deliveries(Direction::Inbound);
                Some(Disposition::Accepted)
            }
        }
    }
}
