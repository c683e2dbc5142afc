//! Reply-address learning and the follow-up link attaches.

use tracing::{debug, info, warn};

use super::{Adaptor, LinkRole};
use crate::{
    core::{LinkDirection, RouterCore},
    ids::LinkId,
    terminus::{self, Terminus},
};

impl<C: RouterCore> Adaptor<C> {
    /// Handle completion of a link attach.
    ///
    /// Only the dynamic reply link triggers work: its source carries the
    /// address the peer assigned, which becomes the reply-to of every message
    /// the adaptor sends. The send and receive links are attached only after
    /// that address is known.
    pub(super) fn handle_second_attach(
        &mut self,
        link: LinkId,
        source: Option<&Terminus>,
        target: Option<&Terminus>,
    ) {
        debug!(
            %link,
            source = %terminus::describe(source),
            target = %terminus::describe(target),
            trace = self.trace,
            "second attach"
        );

        if self.links.role_of(link) != Some(LinkRole::DynamicReply) {
            return;
        }
        if self.reply_to.is_some() {
            debug!(%link, "reply address already learned");
            return;
        }
        let Some(address) = source.and_then(Terminus::address) else {
            warn!(%link, "dynamic reply link attached without an address");
            return;
        };
        self.reply_to = Some(address.to_owned());
        info!(reply_to = address, "reply address assigned");

        self.attach_send_and_receive_links();
    }

    fn attach_send_and_receive_links(&mut self) {
        let Some(connection) = self.connection else {
            return;
        };

        let simple = self.core.attach_link(
            connection,
            LinkDirection::Outbound,
            Terminus::anonymous(),
            Terminus::with_address(&self.config.simple_address),
            &self.config.link_name(1),
        );
        let stream_send = self.core.attach_link(
            connection,
            LinkDirection::Outbound,
            Terminus::anonymous(),
            Terminus::with_address(&self.config.stream_address),
            &self.config.link_name(2),
        );
        let stream_receive = self.core.attach_link(
            connection,
            LinkDirection::Inbound,
            Terminus::with_address(&self.config.stream_address),
            Terminus::anonymous(),
            &self.config.link_name(3),
        );

        self.links.simple_send = Some(simple);
        self.links.stream_send = Some(stream_send);
        self.links.stream_receive = Some(stream_receive);
        debug!(%simple, %stream_send, %stream_receive, "send and receive links attaching");
    }
}
