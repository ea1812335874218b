//! Create-delivery boundary for whichever transport hosts it.

use std::sync::Arc;

use courier_core::{DeliveryId, OrderId};
use serde::Serialize;

use super::{ApiError, CreateDeliveryRequest};
use crate::application::DeliveryService;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryResponse {
    pub delivery_id: DeliveryId,
}

pub struct DeliveryEndpoint {
    service: Arc<DeliveryService>,
}

impl DeliveryEndpoint {
    pub fn new(service: Arc<DeliveryService>) -> Self {
        Self { service }
    }

    /// Raw JSON body: `{"order_id": <int>, "address": <string>}`.
    pub async fn create(&self, body: &[u8]) -> Result<CreateDeliveryResponse, ApiError> {
        let request = CreateDeliveryRequest::from_slice(body)?;
        self.handle(request).await
    }

    pub async fn create_delivery(
        &self,
        order_id: OrderId,
        address: &str,
    ) -> Result<CreateDeliveryResponse, ApiError> {
        let request = CreateDeliveryRequest::new(order_id, address)?;
        self.handle(request).await
    }

    async fn handle(&self, request: CreateDeliveryRequest) -> Result<CreateDeliveryResponse, ApiError> {
        let delivery_id = self
            .service
            .create_delivery(request.order_id, &request.address)
            .await?;
        Ok(CreateDeliveryResponse { delivery_id })
    }
}
