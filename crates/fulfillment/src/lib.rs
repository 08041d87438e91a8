use adapt_dash_core::models::{FulfillmentRequest, FulfillmentResponse};
use anyhow::Result;
use async_trait::async_trait;

/// The `/api/updateAdaptDetails` route, as seen from the dashboard.
#[async_trait]
pub trait FulfillmentClient: Send + Sync {
    async fn update_adapt_details(&self, request: &FulfillmentRequest)
        -> Result<FulfillmentResponse>;
}

pub mod http;
pub mod mock;
