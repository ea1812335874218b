use courier_core::{DeliveryId, OrderId};
use thiserror::Error;

/// The order already has a delivery. Expected and recoverable: the caller reports `delivery_id`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Delivery for order #{order_id} already exists")]
pub struct OrderDeliveryAlreadyExists {
    pub order_id: OrderId,
    pub delivery_id: DeliveryId,
}
