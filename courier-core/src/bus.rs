//! Event bus: where the relay hands published facts to downstream consumers.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::outbox::OutboxMessage;

#[derive(Error, Debug)]
pub enum BusError {
    #[error("event bus closed")]
    Closed,
}

/// Event bus adapter. Delivery is at-least-once: a message may be published again if marking it
/// published failed, so consumers deduplicate by `OutboxMessage::id`.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, message: &OutboxMessage) -> Result<(), BusError>;
}

/// In-process bus backed by an unbounded channel with a single consumer.
#[derive(Clone)]
pub struct ChannelBus {
    tx: mpsc::UnboundedSender<OutboxMessage>,
}

impl ChannelBus {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboxMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventBus for ChannelBus {
    async fn publish(&self, message: &OutboxMessage) -> Result<(), BusError> {
        self.tx.send(message.clone()).map_err(|_| BusError::Closed)
    }
}
