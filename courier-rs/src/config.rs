//! Runtime settings: command-line flags with environment fallbacks.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use thiserror::Error;

use courier_core::relay::{DEFAULT_BATCH_SIZE, DEFAULT_INTERVAL};

use crate::geo::{FixedGeoProvider, GeoObjectProvider, HttpGeoProvider, LoadError};

const DEFAULT_RELAY_INTERVAL_MS: u64 = DEFAULT_INTERVAL.as_millis() as u64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no address provider configured: set --geocoder-url or --known-addresses")]
    NoGeoProvider,
    #[error(transparent)]
    KnownAddresses(#[from] LoadError),
}

#[derive(Args, Clone, Debug)]
pub struct Settings {
    /// SQLite database URL.
    #[arg(long, env = "COURIER_DATABASE_URL", default_value = "sqlite://courier.db", global = true)]
    pub database_url: String,

    #[arg(long, env = "COURIER_MAX_CONNECTIONS", default_value_t = 5, global = true)]
    pub max_connections: u32,

    /// Base URL of the HTTP geocoder (plain http; route TLS through an egress proxy).
    #[arg(long, env = "COURIER_GEOCODER_URL", global = true)]
    pub geocoder_url: Option<String>,

    #[arg(long, env = "COURIER_GEOCODER_API_KEY", hide_env_values = true, global = true)]
    pub geocoder_api_key: Option<String>,

    #[arg(long, env = "COURIER_GEOCODER_TIMEOUT_MS", default_value_t = 3000, global = true)]
    pub geocoder_timeout_ms: u64,

    /// JSON file mapping addresses to geo objects. Takes precedence over --geocoder-url.
    #[arg(long, env = "COURIER_KNOWN_ADDRESSES", global = true)]
    pub known_addresses: Option<PathBuf>,

    #[arg(long, env = "COURIER_RELAY_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE, global = true)]
    pub relay_batch_size: usize,

    #[arg(long, env = "COURIER_RELAY_INTERVAL_MS", default_value_t = DEFAULT_RELAY_INTERVAL_MS, global = true)]
    pub relay_interval_ms: u64,

    /// tracing-subscriber filter directive, e.g. `courier_rs=debug,info`.
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_filter: String,
}

impl Settings {
    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_millis(self.geocoder_timeout_ms)
    }

    pub fn relay_interval(&self) -> Duration {
        Duration::from_millis(self.relay_interval_ms)
    }

    /// The fixed table when `known_addresses` is set, otherwise the HTTP geocoder.
    pub fn geo_provider(&self) -> Result<Arc<dyn GeoObjectProvider>, ConfigError> {
        if let Some(path) = &self.known_addresses {
            let fixed = FixedGeoProvider::from_json_file(path)?;
            return Ok(Arc::new(fixed));
        }
        let url = self.geocoder_url.as_deref().ok_or(ConfigError::NoGeoProvider)?;
        let mut provider = HttpGeoProvider::new(url);
        if let Some(key) = &self.geocoder_api_key {
            provider = provider.api_key(key.as_str());
        }
        Ok(Arc::new(provider))
    }
}
