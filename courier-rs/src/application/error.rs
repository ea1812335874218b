use courier_core::{AllocationError, OrderId, StoreError};
use thiserror::Error;
use tracing::{debug, error};

use crate::domain::OrderDeliveryAlreadyExists;
use crate::geo::GeoError;

/// Everything `create_delivery` can fail with.
#[derive(Error, Debug)]
pub enum CreateDeliveryError {
    #[error("address `{address}` cannot be resolved")]
    AddressNotResolvable { address: String },
    #[error("address lookup failed: {0}")]
    Upstream(#[source] GeoError),
    #[error(transparent)]
    AlreadyExists(#[from] OrderDeliveryAlreadyExists),
    #[error("delivery id allocation failed: {0}")]
    Allocation(#[from] AllocationError),
    #[error("delivery store failed: {0}")]
    Store(#[from] StoreError),
}

impl CreateDeliveryError {
    /// Infrastructure failures worth an operator's attention. Conflicts and unresolvable
    /// addresses are ordinary outcomes.
    pub fn is_incident(&self) -> bool {
        matches!(
            self,
            CreateDeliveryError::Upstream(_)
                | CreateDeliveryError::Allocation(_)
                | CreateDeliveryError::Store(_)
        )
    }

    /// Whether the same request may succeed later without changes.
    pub fn is_transient(&self) -> bool {
        matches!(self, CreateDeliveryError::Upstream(_))
    }

    /// Incidents go out at `error`; conflicts and unresolvable addresses at `debug`.
    pub fn log(&self, order_id: OrderId) {
        if self.is_incident() {
            error!(%order_id, error = %self, transient = self.is_transient(), "delivery intake failed");
        } else {
            debug!(%order_id, reason = %self, "delivery request rejected");
        }
    }
}
