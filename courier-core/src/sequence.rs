//! Delivery id sources.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use thiserror::Error;

use crate::model::DeliveryId;

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("delivery id sequence exhausted")]
    Exhausted,
    #[error("delivery id source unavailable: {0}")]
    Unavailable(String),
}

/// Source of delivery ids. Must be safe for concurrent use and never hand out an id twice.
#[async_trait]
pub trait IdSource: Send + Sync {
    async fn next_id(&self) -> Result<DeliveryId, AllocationError>;
}

/// Lock-free in-process sequence. Ids are never reused; unused ids are simply skipped.
#[derive(Debug)]
pub struct AtomicSequence {
    next: AtomicI64,
}

impl AtomicSequence {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Sequence whose first id is `first`. Ids are positive, so values below 1 start at 1.
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first.max(1)),
        }
    }

    /// Allocate without going through the async trait.
    pub fn allocate(&self) -> Result<DeliveryId, AllocationError> {
        // i64::MIN marks the sequence as spent once i64::MAX has been handed out.
        const SPENT: i64 = i64::MIN;
        let current = self
            .next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                if n == SPENT {
                    None
                } else {
                    Some(n.checked_add(1).unwrap_or(SPENT))
                }
            })
            .map_err(|_| AllocationError::Exhausted)?;
        Ok(DeliveryId::new(current))
    }
}

impl Default for AtomicSequence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdSource for AtomicSequence {
    async fn next_id(&self) -> Result<DeliveryId, AllocationError> {
        self.allocate()
    }
}
