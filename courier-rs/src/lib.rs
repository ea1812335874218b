//! Courier: order delivery intake on courier-core.
//!
//! Addresses are checked against a geocoder before a delivery id is allocated; each order gets at
//! most one delivery, and every creation records one `DeliveryCreated` fact for the outbox relay.

pub mod api;
pub mod application;
pub mod config;
pub mod ddd;
pub mod domain;
pub mod geo;
pub mod logging;

pub use api::{ApiError, CreateDeliveryRequest, CreateDeliveryResponse, DeliveryEndpoint, FieldError};
pub use application::{
    CreateDeliveryError, CreateOrderDelivery, CreateOrderDeliveryHandler, DeliveryIntake, DeliveryService,
};
pub use config::Settings;
pub use ddd::{Command, CommandHandler};
pub use domain::{DeliveryCreated, DomainEvent, OrderDeliveryAlreadyExists};
pub use geo::{AddressValidator, GeoError, GeoObject, GeoObjectProvider};

pub use courier_core::{DeliveryId, DeliveryRecord, OrderId};
