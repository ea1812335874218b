//! Domain events and their outbox form.

use courier_core::{DeliveryId, OrderId, OutboxEvent};
use serde::{Deserialize, Serialize};

/// Domain event: a serialisable fact with a stable type name used on the bus.
pub trait DomainEvent: Serialize + Send + Sync {
    fn event_type() -> &'static str
    where
        Self: Sized;

    fn to_outbox(&self) -> Result<OutboxEvent, serde_json::Error>
    where
        Self: Sized,
    {
        Ok(OutboxEvent::new(Self::event_type(), serde_json::to_value(self)?))
    }
}

/// A delivery was durably created for an order. Routing and courier dispatch start from here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryCreated {
    pub delivery_id: DeliveryId,
    pub order_id: OrderId,
    pub address: String,
}

impl DomainEvent for DeliveryCreated {
    fn event_type() -> &'static str {
        "delivery.created"
    }
}
