//! Create-delivery request and its field constraints.

use serde_json::Value;
use thiserror::Error;

use courier_core::OrderId;

use super::FieldError;

pub const NOT_BLANK: &str = "This value should not be blank.";
pub const TYPE_INT: &str = "This value should be of type int.";
pub const TYPE_STRING: &str = "This value should be of type string.";
pub const NOT_AN_OBJECT: &str = "Request body must be a JSON object.";

/// One entry per offending field.
#[derive(Error, Debug, Clone, Default, PartialEq)]
#[error("request validation failed ({} error(s))", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn body(message: &str) -> Self {
        Self {
            errors: vec![FieldError::new(None, message)],
        }
    }

    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(Some(field), message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateDeliveryRequest {
    pub order_id: OrderId,
    pub address: String,
}

impl CreateDeliveryRequest {
    /// Typed input still has to carry a non-blank address.
    pub fn new(order_id: OrderId, address: &str) -> Result<Self, ValidationErrors> {
        let address = address.trim();
        if address.is_empty() {
            let mut errors = ValidationErrors::default();
            errors.push("address", NOT_BLANK);
            return Err(errors);
        }
        Ok(Self {
            order_id,
            address: address.to_owned(),
        })
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, ValidationErrors> {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| ValidationErrors::body(NOT_AN_OBJECT))?;
        Self::from_value(&value)
    }

    /// `{"order_id": <int>, "address": <string>}`. Every bad field is reported, not just the first.
    pub fn from_value(value: &Value) -> Result<Self, ValidationErrors> {
        let Some(object) = value.as_object() else {
            return Err(ValidationErrors::body(NOT_AN_OBJECT));
        };
        let mut errors = ValidationErrors::default();

        let order_id = match object.get("order_id") {
            None | Some(Value::Null) => {
                errors.push("order_id", NOT_BLANK);
                None
            }
            Some(v) => match v.as_i64() {
                Some(n) => Some(OrderId::new(n)),
                None => {
                    errors.push("order_id", TYPE_INT);
                    None
                }
            },
        };

        let address = match object.get("address") {
            None | Some(Value::Null) => {
                errors.push("address", NOT_BLANK);
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                errors.push("address", NOT_BLANK);
                None
            }
            Some(Value::String(s)) => Some(s.trim().to_owned()),
            Some(_) => {
                errors.push("address", TYPE_STRING);
                None
            }
        };

        match (order_id, address) {
            (Some(order_id), Some(address)) if errors.is_empty() => Ok(Self { order_id, address }),
            _ => Err(errors),
        }
    }
}
