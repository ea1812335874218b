//! Geocoding: provider protocol, address validator, HTTP and fixed providers.

pub mod fixed;
pub mod http;
pub mod validator;

pub use fixed::{FixedGeoProvider, LoadError};
pub use http::HttpGeoProvider;
pub use validator::AddressValidator;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// A resolved geographic object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoObject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub point: Option<GeoPoint>,
}

/// Lookup failures. "Not found" is not an error: providers return `Ok(None)`.
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("geocoder did not answer within {0:?}")]
    Timeout(Duration),
    #[error("geocoder transport error: {0}")]
    Transport(String),
    #[error("geocoder answered with status {0}")]
    Status(u16),
    #[error("invalid geocoder response: {0}")]
    InvalidResponse(String),
    #[error("invalid geocoder request: {0}")]
    Request(String),
}

/// How to resolve a free-text address. Implementations: HTTP geocoder, fixed table.
#[async_trait]
pub trait GeoObjectProvider: Send + Sync {
    async fn find_geo_object(&self, address: &str) -> Result<Option<GeoObject>, GeoError>;
}
