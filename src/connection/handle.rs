//! Sending side of a connection actor.

use tokio::sync::{mpsc, oneshot};

use super::CoreEvent;
use crate::{
    activation::ActivationHandle,
    delivery::Delivery,
    disposition::Disposition,
    error::{AdaptorError, Result},
    ids::LinkId,
    terminus::Terminus,
};

/// Cloneable handle the core uses to reach a running connection actor.
///
/// Events sent through one handle are handled in send order. Activation
/// requests bypass the event channel and never block.
#[derive(Clone, Debug)]
pub struct AdaptorHandle {
    events: mpsc::Sender<CoreEvent>,
    activation: ActivationHandle,
}

impl AdaptorHandle {
    pub(super) fn new(events: mpsc::Sender<CoreEvent>, activation: ActivationHandle) -> Self {
        Self { events, activation }
    }

    /// Queue a core event for the actor.
    ///
    /// # Errors
    ///
    /// Returns [`AdaptorError::ConnectionClosed`] if the actor has stopped.
    pub async fn send(&self, event: CoreEvent) -> Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| AdaptorError::ConnectionClosed)
    }

    async fn request<T>(&self, event: CoreEvent, reply: oneshot::Receiver<T>) -> Result<T> {
        self.send(event).await?;
        reply.await.map_err(|_| AdaptorError::ReplyDropped)
    }

    /// Signal that the connection has protocol work to do.
    pub fn activate(&self) { self.activation.activate(); }

    /// Handle for activation requests alone.
    #[must_use]
    pub fn activation(&self) -> ActivationHandle { self.activation.clone() }

    /// Report completion of a link attach.
    ///
    /// # Errors
    ///
    /// Returns [`AdaptorError::ConnectionClosed`] if the actor has stopped.
    pub async fn second_attach(
        &self,
        link: LinkId,
        source: Option<Terminus>,
        target: Option<Terminus>,
    ) -> Result<()> {
        self.send(CoreEvent::SecondAttach {
            link,
            source,
            target,
        })
        .await
    }

    /// Grant credit on a link.
    ///
    /// # Errors
    ///
    /// Returns [`AdaptorError::ConnectionClosed`] if the actor has stopped.
    pub async fn flow(&self, link: LinkId, credit: i32) -> Result<()> {
        self.send(CoreEvent::Flow { link, credit }).await
    }

    /// Push a delivery to the adaptor and wait for its decision.
    ///
    /// # Errors
    ///
    /// Returns [`AdaptorError::ConnectionClosed`] if the actor has stopped or
    /// [`AdaptorError::ReplyDropped`] if it stopped before answering.
    pub async fn deliver(
        &self,
        link: LinkId,
        delivery: Delivery,
        settled: bool,
    ) -> Result<Option<Disposition>> {
        let (tx, rx) = oneshot::channel();
        let event = CoreEvent::Deliver {
            link,
            delivery,
            settled,
            reply: Some(tx),
        };
        self.request(event, rx).await
    }

    /// Report a disposition or settlement change.
    ///
    /// # Errors
    ///
    /// Returns [`AdaptorError::ConnectionClosed`] if the actor has stopped.
    pub async fn delivery_update(
        &self,
        delivery: Delivery,
        disposition: Disposition,
        settled: bool,
    ) -> Result<()> {
        self.send(CoreEvent::DeliveryUpdate {
            delivery,
            disposition,
            settled,
        })
        .await
    }

    /// Ask the adaptor to pull up to `limit` deliveries.
    ///
    /// # Errors
    ///
    /// Returns [`AdaptorError::ConnectionClosed`] if the actor has stopped or
    /// [`AdaptorError::ReplyDropped`] if it stopped before answering.
    pub async fn push(&self, link: LinkId, limit: usize) -> Result<usize> {
        let (tx, rx) = oneshot::channel();
        let event = CoreEvent::Push {
            link,
            limit,
            reply: Some(tx),
        };
        self.request(event, rx).await
    }

    /// Ask how much credit the adaptor extends on `link`.
    ///
    /// # Errors
    ///
    /// Returns [`AdaptorError::ConnectionClosed`] if the actor has stopped or
    /// [`AdaptorError::ReplyDropped`] if it stopped before answering.
    pub async fn get_credit(&self, link: LinkId) -> Result<u32> {
        let (tx, rx) = oneshot::channel();
        self.request(CoreEvent::GetCredit { link, reply: tx }, rx)
            .await
    }
}
