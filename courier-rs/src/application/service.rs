//! Delivery service: validate the address, then hand over to intake.

use std::sync::Arc;

use courier_core::{DeliveryId, DeliveryRecord, DeliveryStore, OrderId, StoreError};
use tracing::info;

use super::{CreateDeliveryError, DeliveryIntake};
use crate::geo::AddressValidator;

pub struct DeliveryService {
    validator: AddressValidator,
    intake: DeliveryIntake,
    store: Arc<dyn DeliveryStore>,
}

impl DeliveryService {
    pub fn new(validator: AddressValidator, intake: DeliveryIntake, store: Arc<dyn DeliveryStore>) -> Self {
        Self {
            validator,
            intake,
            store,
        }
    }

    /// Unresolvable addresses fail before any id is allocated or anything is written.
    pub async fn create_delivery(
        &self,
        order_id: OrderId,
        address: &str,
    ) -> Result<DeliveryId, CreateDeliveryError> {
        let result = self.try_create(order_id, address).await;
        match &result {
            Ok(delivery_id) => info!(%order_id, %delivery_id, "delivery created"),
            Err(e) => e.log(order_id),
        }
        result
    }

    async fn try_create(&self, order_id: OrderId, address: &str) -> Result<DeliveryId, CreateDeliveryError> {
        match self.validator.validate(address).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(CreateDeliveryError::AddressNotResolvable {
                    address: address.to_owned(),
                })
            }
            Err(e) => return Err(CreateDeliveryError::Upstream(e)),
        }
        self.intake.create_delivery(order_id, address).await
    }

    pub async fn find_delivery(&self, order_id: OrderId) -> Result<Option<DeliveryRecord>, StoreError> {
        self.store.find_by_order(order_id).await
    }
}
