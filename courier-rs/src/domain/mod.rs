//! Domain: delivery events and domain errors. Records and ids live in `courier_core`.

pub mod error;
pub mod events;

pub use courier_core::{DeliveryId, DeliveryRecord, DeliveryStatus, OrderId};
pub use error::OrderDeliveryAlreadyExists;
pub use events::{DeliveryCreated, DomainEvent};
