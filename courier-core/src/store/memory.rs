//! In-process store. The map entry lock makes check-and-insert indivisible.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::{DeliveryStore, InsertOutcome, StoreError};
use crate::model::{DeliveryId, DeliveryRecord, OrderId};
use crate::outbox::{OutboxEvent, OutboxMessage, OutboxStorage};
use crate::sequence::{AllocationError, AtomicSequence, IdSource};

#[derive(Default)]
struct Outbox {
    last_id: i64,
    pending: BTreeMap<i64, OutboxMessage>,
}

/// Store kept in memory: deliveries by order, delivery ids in use, pending outbox entries and an
/// id sequence. Durable only for the life of the process.
#[derive(Default)]
pub struct InMemoryStore {
    deliveries: DashMap<OrderId, DeliveryRecord>,
    taken_ids: DashMap<DeliveryId, OrderId>,
    outbox: Mutex<Outbox>,
    sequence: AtomicSequence,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sequence(sequence: AtomicSequence) -> Self {
        Self {
            sequence,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}

#[async_trait]
impl DeliveryStore for InMemoryStore {
    async fn insert(
        &self,
        record: &DeliveryRecord,
        event: &OutboxEvent,
    ) -> Result<InsertOutcome, StoreError> {
        // Lock order: deliveries shard, then taken_ids shard, then outbox.
        match self.deliveries.entry(record.order_id) {
            Entry::Occupied(existing) => Ok(InsertOutcome::Conflict {
                existing: existing.get().delivery_id,
            }),
            Entry::Vacant(slot) => {
                match self.taken_ids.entry(record.delivery_id) {
                    Entry::Occupied(_) => {
                        return Err(StoreError::DuplicateDeliveryId(record.delivery_id))
                    }
                    Entry::Vacant(id_slot) => {
                        id_slot.insert(record.order_id);
                    }
                }
                {
                    let mut outbox = self.outbox.lock();
                    outbox.last_id += 1;
                    let id = outbox.last_id;
                    outbox.pending.insert(
                        id,
                        OutboxMessage {
                            id,
                            event_type: event.event_type.clone(),
                            payload: event.payload.clone(),
                        },
                    );
                }
                slot.insert(record.clone());
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn find_by_order(&self, order_id: OrderId) -> Result<Option<DeliveryRecord>, StoreError> {
        Ok(self.deliveries.get(&order_id).map(|r| r.value().clone()))
    }
}

#[async_trait]
impl OutboxStorage for InMemoryStore {
    async fn fetch_pending(&self, limit: usize) -> Result<Vec<OutboxMessage>, StoreError> {
        let outbox = self.outbox.lock();
        Ok(outbox.pending.values().take(limit).cloned().collect())
    }

    async fn mark_published(&self, ids: &[i64]) -> Result<(), StoreError> {
        let mut outbox = self.outbox.lock();
        for id in ids {
            outbox.pending.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl IdSource for InMemoryStore {
    async fn next_id(&self) -> Result<DeliveryId, AllocationError> {
        self.sequence.allocate()
    }
}
