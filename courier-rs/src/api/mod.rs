//! Boundary exposed to the transport layer: request validation, endpoint, structured errors.

pub mod endpoint;
pub mod error;
pub mod request;

pub use endpoint::{CreateDeliveryResponse, DeliveryEndpoint};
pub use error::{ApiError, FieldError};
pub use request::{CreateDeliveryRequest, ValidationErrors};
