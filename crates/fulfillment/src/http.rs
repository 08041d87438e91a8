use super::FulfillmentClient;
use adapt_dash_core::{
    dashboard::{DashboardSettings, ADAPT_KEY_HEADER},
    models::{FulfillmentRequest, FulfillmentResponse},
    parsing::parse_fulfillment_response,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Calls the fulfillment route over HTTP.
///
/// The route answers `{error}` together with a 4xx status for orders it cannot
/// fulfil, so the body is read whatever the status; only a body that is not
/// JSON counts as a failure.
#[derive(Clone)]
pub struct HttpFulfillmentClient {
    pub endpoint_url: String,
    adapt_key: String,
    http_client: reqwest::Client,
}

impl HttpFulfillmentClient {
    pub fn new(settings: &DashboardSettings, timeout: Duration) -> Result<Arc<Self>> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Arc::new(Self {
            endpoint_url: settings.endpoint_url(),
            adapt_key: settings.adapt_key.clone(),
            http_client,
        }))
    }
}

#[async_trait]
impl FulfillmentClient for HttpFulfillmentClient {
    async fn update_adapt_details(
        &self,
        request: &FulfillmentRequest,
    ) -> Result<FulfillmentResponse> {
        let resp = self
            .http_client
            .post(&self.endpoint_url)
            .header(ADAPT_KEY_HEADER, &self.adapt_key)
            .json(request)
            .send()
            .await
            .context("Failed to reach fulfillment endpoint")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("Failed to read fulfillment response")?;

        tracing::debug!(%status, shop = %request.shop, invoice = %request.invoice_number, "fulfillment endpoint replied");

        parse_fulfillment_response(&body)
            .with_context(|| format!("Unexpected fulfillment reply ({status})"))
    }
}
