//! Fixed table of known addresses. For tests and offline runs.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use super::{GeoError, GeoObject, GeoObjectProvider};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid address table: {0}")]
    Json(#[from] serde_json::Error),
}

/// Addresses match case-insensitively, ignoring surrounding and repeated whitespace.
#[derive(Clone, Debug, Default)]
pub struct FixedGeoProvider {
    known: HashMap<String, GeoObject>,
}

fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl FixedGeoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: &str, object: GeoObject) -> Self {
        self.insert(address, object);
        self
    }

    pub fn insert(&mut self, address: &str, object: GeoObject) {
        self.known.insert(normalize(address), object);
    }

    /// Table from JSON: `{ "<address>": { "name": "...", "point": { "longitude": .., "latitude": .. } } }`.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let table: HashMap<String, GeoObject> = serde_json::from_str(json)?;
        let mut provider = Self::new();
        for (address, object) in table {
            provider.insert(&address, object);
        }
        Ok(provider)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

#[async_trait]
impl GeoObjectProvider for FixedGeoProvider {
    async fn find_geo_object(&self, address: &str) -> Result<Option<GeoObject>, GeoError> {
        Ok(self.known.get(&normalize(address)).cloned())
    }
}
