//! `CreateOrderDelivery`: record a delivery with a pre-allocated id, at most once per order.

use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{DeliveryId, DeliveryRecord, DeliveryStore, InsertOutcome, OrderId};

use super::CreateDeliveryError;
use crate::ddd::{Command, CommandHandler};
use crate::domain::{DeliveryCreated, DomainEvent, OrderDeliveryAlreadyExists};

#[derive(Clone, Debug, PartialEq, Eq, Command)]
pub struct CreateOrderDelivery {
    pub delivery_id: DeliveryId,
    pub order_id: OrderId,
    pub address: String,
}

/// Writes the record and its `DeliveryCreated` fact in one store operation.
pub struct CreateOrderDeliveryHandler {
    store: Arc<dyn DeliveryStore>,
}

impl CreateOrderDeliveryHandler {
    pub fn new(store: Arc<dyn DeliveryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler<CreateOrderDelivery> for CreateOrderDeliveryHandler {
    type Output = DeliveryRecord;
    type Error = CreateDeliveryError;

    async fn handle(&self, cmd: CreateOrderDelivery) -> Result<DeliveryRecord, CreateDeliveryError> {
        let record = DeliveryRecord::created(cmd.delivery_id, cmd.order_id, cmd.address);
        let event = DeliveryCreated {
            delivery_id: record.delivery_id,
            order_id: record.order_id,
            address: record.address.clone(),
        }
        .to_outbox()
        .map_err(courier_core::StoreError::from)?;
        match self.store.insert(&record, &event).await? {
            InsertOutcome::Inserted => Ok(record),
            InsertOutcome::Conflict { existing } => Err(OrderDeliveryAlreadyExists {
                order_id: record.order_id,
                delivery_id: existing,
            }
            .into()),
        }
    }
}
