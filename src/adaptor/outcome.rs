//! Disposition and settlement of deliveries.

use tracing::{debug, warn};

use super::Adaptor;
use crate::{core::RouterCore, delivery::Delivery, disposition::Disposition, metrics};

const SETTLED_LABEL: &str = "delivery_update - settled delivery";

impl<C: RouterCore> Adaptor<C> {
    /// Observe a disposition or settlement change.
    ///
    /// Outcomes are logged, never retried. A held reference is released
    /// exactly when settlement is observed; updates for deliveries the
    /// adaptor does not hold are ignored.
    pub(super) fn handle_delivery_update(
        &mut self,
        delivery: &Delivery,
        disposition: Disposition,
        settled: bool,
    ) {
        let id = delivery.id();
        if disposition.is_non_accepting() {
            warn!(delivery = %id, disp = disposition.name(), settled, "delivery not accepted");
        } else {
            debug!(delivery = %id, disp = disposition.name(), settled, "delivery update");
        }

        if self.stream.delivery() == Some(id) && self.stream.is_recorded(delivery.message()) {
            debug!(delivery = %id, chunks = self.stream.chunks(), "streaming delivery updated mid-stream; stream abandoned");
            self.stream.reset();
        }

        if !settled {
            return;
        }
        if self.stream.delivery() == Some(id) {
            self.stream.reset();
        }
        if self.deliveries.release(id, &mut self.core, SETTLED_LABEL) {
            metrics::inc_settlements(disposition);
        } else {
            debug!(delivery = %id, "settlement for untracked delivery ignored");
        }
    }
}
