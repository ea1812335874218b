//! Address validator: one bounded lookup per call.

use std::sync::Arc;
use std::time::Duration;

use super::{GeoError, GeoObjectProvider};

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

pub struct AddressValidator {
    provider: Arc<dyn GeoObjectProvider>,
    timeout: Duration,
}

impl AddressValidator {
    pub fn new(provider: Arc<dyn GeoObjectProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `Ok(true)` if the address resolves, `Ok(false)` if the provider found nothing.
    /// A lookup that outlives the timeout is `GeoError::Timeout`, not "not found".
    pub async fn validate(&self, address: &str) -> Result<bool, GeoError> {
        match tokio::time::timeout(self.timeout, self.provider.find_geo_object(address)).await {
            Ok(found) => found.map(|object| object.is_some()),
            Err(_) => Err(GeoError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{FixedGeoProvider, GeoObject};
    use async_trait::async_trait;

    struct Stalled;

    #[async_trait]
    impl GeoObjectProvider for Stalled {
        async fn find_geo_object(&self, _address: &str) -> Result<Option<GeoObject>, GeoError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn known_and_unknown_addresses() {
        let provider = FixedGeoProvider::new().with_address(
            "221B Baker Street",
            GeoObject {
                name: "221B Baker Street".into(),
                ..GeoObject::default()
            },
        );
        let validator = AddressValidator::new(Arc::new(provider));
        assert!(validator.validate("221B Baker Street").await.unwrap());
        assert!(!validator.validate("zzzzz-not-a-place").await.unwrap());
    }

    #[tokio::test]
    async fn timeout_is_a_lookup_failure() {
        let validator =
            AddressValidator::new(Arc::new(Stalled)).with_timeout(Duration::from_millis(20));
        let err = validator.validate("anywhere").await.unwrap_err();
        assert!(matches!(err, GeoError::Timeout(_)));
    }
}
