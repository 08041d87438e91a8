use adapt_dash_core::{dashboard::DashboardSettings, tester::ManualTester};
use fulfillment::FulfillmentClient;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::auth::SessionAuthenticator;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<DashboardSettings>,
    pub client: Arc<dyn FulfillmentClient>,
    pub auth: Arc<dyn SessionAuthenticator>,
    /// Client id handed to App Bridge on the page.
    pub api_key: Option<String>,
    /// Tester card state per shop, only while a submission is pending. Held
    /// only across synchronous transitions.
    pub testers: Arc<Mutex<HashMap<String, ManualTester>>>,
}

impl AppState {
    pub fn new(
        settings: DashboardSettings,
        client: Arc<dyn FulfillmentClient>,
        auth: Arc<dyn SessionAuthenticator>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            client,
            auth,
            api_key: None,
            testers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty());
        self
    }

    /// Tester state as a fresh page visit sees it: in-flight work is kept, the
    /// input is not.
    pub async fn tester_view(&self, shop: &str) -> ManualTester {
        let testers = self.testers.lock().await;
        let mut tester = testers.get(shop).cloned().unwrap_or_default();
        tester.set_input("");
        tester
    }
}
