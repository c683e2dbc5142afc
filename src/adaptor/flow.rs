//! Credit-gated outbound sends.

use tracing::{debug, warn};

use super::{Adaptor, LinkRole};
use crate::{
    core::RouterCore,
    ids::LinkId,
    message,
    metrics::{self, Direction},
};

impl<C: RouterCore> Adaptor<C> {
    /// Handle a credit grant on an outbound link.
    ///
    /// Under [`crate::config::CreditPolicy::SingleSend`] the granted count is
    /// informational and exactly one send action is attempted.
    pub(super) fn handle_flow(&mut self, link: LinkId, credit: i32) {
        debug!(%link, credit, trace = self.trace, "credit issued");

        match self.links.role_of(link) {
            Some(LinkRole::SimpleSend) => {
                let sends = self.config.credit_policy.sends_for(credit);
                for _ in 0..sends {
                    if !self.send_one_shot(link) {
                        break;
                    }
                }
            }
            Some(LinkRole::StreamSend) => self.begin_stream(link),
            role => debug!(%link, ?role, "no send behaviour for link"),
        }
    }

    /// Compose and hand over one complete message.
    ///
    /// Returns `false` if the reply address is still unknown.
    fn send_one_shot(&mut self, link: LinkId) -> bool {
        let Some(reply_to) = self.reply_to.as_deref() else {
            warn!(%link, "reply address not yet known; send skipped");
            return false;
        };
        let message = message::one_shot(reply_to);
        let reference = self.core.deliver(link, message, false);
        debug!(%link, delivery = %reference.id(), "one-shot delivery handed to core");
        metrics::inc_deliveries(Direction::Outbound);
        self.deliveries.track(reference);
        true
    }
}
