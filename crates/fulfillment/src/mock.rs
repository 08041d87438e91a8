use super::FulfillmentClient;
use adapt_dash_core::models::{FulfillmentRequest, FulfillmentResponse};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(FulfillmentResponse),
    Fail(String),
}

/// Stand-in for the fulfillment route.
///
/// Scripted replies are consumed in order; once the script runs out every
/// request is answered with `{"status":"success"}`.
#[derive(Default)]
pub struct MockClient {
    script: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<FulfillmentRequest>>,
    latency: Duration,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn scripted(replies: impl IntoIterator<Item = MockReply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        })
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            ..Self::default()
        })
    }

    pub fn requests(&self) -> Vec<FulfillmentRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FulfillmentClient for MockClient {
    async fn update_adapt_details(
        &self,
        request: &FulfillmentRequest,
    ) -> Result<FulfillmentResponse> {
        let reply = {
            let mut requests = self.requests.lock().map_err(|_| anyhow!("mock poisoned"))?;
            requests.push(request.clone());
            let mut script = self.script.lock().map_err(|_| anyhow!("mock poisoned"))?;
            script.pop_front()
        };

        // simulate network latency
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }

        match reply {
            Some(MockReply::Respond(resp)) => Ok(resp),
            Some(MockReply::Fail(message)) => Err(anyhow!(message)),
            None => Ok(FulfillmentResponse::success()),
        }
    }
}
