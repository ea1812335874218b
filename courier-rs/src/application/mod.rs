//! Application: commands, handlers and services for delivery intake.

pub mod create_delivery;
pub mod error;
pub mod intake;
pub mod service;

pub use create_delivery::{CreateOrderDelivery, CreateOrderDeliveryHandler};
pub use error::CreateDeliveryError;
pub use intake::DeliveryIntake;
pub use service::DeliveryService;
