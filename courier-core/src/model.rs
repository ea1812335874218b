//! Delivery model shared by stores and the intake facade.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a delivery. Allocated from an [`IdSource`](crate::IdSource) before the record exists.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(i64);

impl DeliveryId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Caller-supplied order identifier. Existence of the order is not checked here.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state owned by intake. Later states belong to routing and dispatch.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Created,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Created => "created",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(DeliveryStatus::Created),
            _ => None,
        }
    }
}

/// Delivery record. At most one exists per order id.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub delivery_id: DeliveryId,
    pub order_id: OrderId,
    pub address: String,
    pub status: DeliveryStatus,
}

impl DeliveryRecord {
    /// New record in the `Created` state.
    pub fn created(delivery_id: DeliveryId, order_id: OrderId, address: impl Into<String>) -> Self {
        Self {
            delivery_id,
            order_id,
            address: address.into(),
            status: DeliveryStatus::Created,
        }
    }
}
