//! Delivery stores: the single source of truth for "does this order already have a delivery".

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{DeliveryId, DeliveryRecord, OrderId};
use crate::outbox::OutboxEvent;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid JSON in outbox: {0}")]
    Json(#[from] serde_json::Error),
    #[error("delivery id {0} is already taken by another order")]
    DuplicateDeliveryId(DeliveryId),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Result of an insert attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InsertOutcome {
    Inserted,
    /// A record already exists for the order; `existing` is its delivery id.
    Conflict { existing: DeliveryId },
}

/// Durable delivery storage.
///
/// `insert` is the check-and-insert: for concurrent inserts with the same order id exactly one
/// returns `Inserted`, every other one returns `Conflict` with the winner's delivery id. The
/// outbox event is written together with the record or not at all.
#[async_trait]
pub trait DeliveryStore: Send + Sync {
    async fn insert(
        &self,
        record: &DeliveryRecord,
        event: &OutboxEvent,
    ) -> Result<InsertOutcome, StoreError>;

    async fn find_by_order(&self, order_id: OrderId) -> Result<Option<DeliveryRecord>, StoreError>;
}
