//! Outbox: facts written in the same transaction as the delivery record, published later by the relay.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::StoreError;

/// Fact to record alongside a delivery: event type name and JSON payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub event_type: String,
    pub payload: Value,
}

impl OutboxEvent {
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

/// Recorded outbox entry. `id` is assigned by the store and grows in insertion order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub id: i64,
    pub event_type: String,
    pub payload: Value,
}

/// Outbox storage: fetch unpublished entries and mark them once the bus accepted them.
#[async_trait]
pub trait OutboxStorage: Send + Sync {
    /// Oldest unpublished entries first, at most `limit`.
    async fn fetch_pending(&self, limit: usize) -> Result<Vec<OutboxMessage>, StoreError>;

    async fn mark_published(&self, ids: &[i64]) -> Result<(), StoreError>;
}
