//! Delivery intake coordinator: allocate id, record once per order, then wake the relay.

use std::sync::Arc;

use courier_core::{DeliveryId, DeliveryStore, IdSource, OrderId, RelayTrigger};
use tracing::debug;

use super::{CreateDeliveryError, CreateOrderDelivery, CreateOrderDeliveryHandler};
use crate::ddd::{Command, CommandHandler};

pub struct DeliveryIntake {
    ids: Arc<dyn IdSource>,
    handler: CreateOrderDeliveryHandler,
    relay: Option<RelayTrigger>,
}

impl DeliveryIntake {
    pub fn new(ids: Arc<dyn IdSource>, store: Arc<dyn DeliveryStore>) -> Self {
        Self {
            ids,
            handler: CreateOrderDeliveryHandler::new(store),
            relay: None,
        }
    }

    /// Kick this relay after every committed delivery.
    pub fn with_relay(mut self, trigger: RelayTrigger) -> Self {
        self.relay = Some(trigger);
        self
    }

    /// Create the delivery for `order_id`.
    ///
    /// The id is allocated before the insert; if the insert loses to an existing delivery the id is
    /// wasted and the error carries the existing delivery's id. On `Ok` the record and its
    /// `DeliveryCreated` fact are committed.
    pub async fn create_delivery(
        &self,
        order_id: OrderId,
        address: &str,
    ) -> Result<DeliveryId, CreateDeliveryError> {
        let delivery_id = self.ids.next_id().await?;
        let cmd = CreateOrderDelivery {
            delivery_id,
            order_id,
            address: address.to_owned(),
        };
        debug!(command = CreateOrderDelivery::name(), %order_id, %delivery_id, "dispatching");
        let record = self.handler.handle(cmd).await?;
        if let Some(relay) = &self.relay {
            relay.kick();
        }
        Ok(record.delivery_id)
    }
}
