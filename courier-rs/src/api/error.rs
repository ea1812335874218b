//! Structured, field-attributed API errors.

use http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

use super::request::ValidationErrors;
use crate::application::CreateDeliveryError;

pub const LOOKUP_UNAVAILABLE: &str = "Address lookup is temporarily unavailable";
pub const INTERNAL: &str = "Internal server error";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl FieldError {
    pub fn new(field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            field: field.map(String::from),
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Error returned to the transport. Serialises as `{"errors": [...]}`; `status()` is the HTTP
/// status the host should answer with. Infrastructure detail never appears here.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiError {
    #[serde(skip_serializing)]
    status: StatusCode,
    pub errors: Vec<FieldError>,
}

impl ApiError {
    pub fn new(status: StatusCode, errors: Vec<FieldError>) -> Self {
        Self { status, errors }
    }

    pub fn bad_request(field: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, vec![FieldError::new(Some(field), message)])
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn to_json(&self) -> Value {
        json!({ "errors": self.errors })
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::new(StatusCode::BAD_REQUEST, e.errors)
    }
}

impl From<CreateDeliveryError> for ApiError {
    fn from(e: CreateDeliveryError) -> Self {
        match e {
            CreateDeliveryError::AddressNotResolvable { address } => Self::bad_request(
                "address",
                format!("Cannot find address `{}` to calculate distance", address),
            ),
            CreateDeliveryError::AlreadyExists(conflict) => Self::new(
                StatusCode::BAD_REQUEST,
                vec![FieldError::new(Some("order_id"), conflict.to_string())
                    .with_payload(json!({ "deliveryId": conflict.delivery_id }))],
            ),
            CreateDeliveryError::Upstream(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                vec![FieldError::new(None, LOOKUP_UNAVAILABLE)],
            ),
            CreateDeliveryError::Allocation(_) | CreateDeliveryError::Store(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                vec![FieldError::new(None, INTERNAL)],
            ),
        }
    }
}
