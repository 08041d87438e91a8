use serde::{Deserialize, Serialize};

pub const DEFAULT_APP_URL: &str = "https://your-app.fly.dev";
pub const DEFAULT_ADAPT_KEY: &str = "12345";
pub const UPDATE_ADAPT_DETAILS_PATH: &str = "/api/updateAdaptDetails";
pub const ADAPT_KEY_HEADER: &str = "X-Adapt-Key";

pub const EXAMPLE_INVOICE_NUMBER: &str = "1001";

pub const SETUP_STEPS: [SetupStep; 3] = [
    SetupStep {
        before: "Send a ",
        emphasis: "POST",
        after: " request to the Endpoint URL.",
    },
    SetupStep {
        before: "Include the ",
        emphasis: "X-Adapt-Key",
        after: " in your headers.",
    },
    SetupStep {
        before: "Pass ",
        emphasis: "invoiceNumber",
        after: " in the JSON body.",
    },
];

/// One line of the quick setup guide, with its emphasised keyword split out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupStep {
    pub before: &'static str,
    pub emphasis: &'static str,
    pub after: &'static str,
}

/// Display configuration for the dashboard, resolved once and handed to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSettings {
    pub app_url: String,
    pub adapt_key: String,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            app_url: DEFAULT_APP_URL.to_string(),
            adapt_key: DEFAULT_ADAPT_KEY.to_string(),
        }
    }
}

impl DashboardSettings {
    /// Empty values fall back to the documented defaults; trailing slashes on
    /// the URL are dropped so the endpoint never contains `//api`.
    pub fn new(app_url: Option<String>, adapt_key: Option<String>) -> Self {
        let app_url = app_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_APP_URL.to_string());
        let adapt_key = adapt_key
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_ADAPT_KEY.to_string());
        Self { app_url, adapt_key }
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.app_url, UPDATE_ADAPT_DETAILS_PATH)
    }
}

/// Loader output for one page visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub shop: String,
    pub api_url: String,
    pub api_key: String,
}

impl DashboardData {
    pub fn load(shop: impl Into<String>, settings: &DashboardSettings) -> Self {
        Self {
            shop: shop.into(),
            api_url: settings.endpoint_url(),
            api_key: settings.adapt_key.clone(),
        }
    }

    /// The sample request body shown in the setup guide.
    pub fn example_body(&self) -> String {
        example_body(&self.shop)
    }
}

pub fn example_body(shop: &str) -> String {
    // serde_json escapes quotes and backslashes in the shop the same way a client would.
    let shop = serde_json::Value::String(shop.to_string());
    format!("{{\n  \"invoiceNumber\": \"{EXAMPLE_INVOICE_NUMBER}\",\n  \"shop\": {shop}\n}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_settings() {
        let settings = DashboardSettings::new(None, None);
        assert_eq!(
            settings.endpoint_url(),
            "https://your-app.fly.dev/api/updateAdaptDetails"
        );
        assert_eq!(settings.adapt_key, "12345");
        assert_eq!(settings, DashboardSettings::default());
    }

    #[test]
    fn empty_values_count_as_unset() {
        let settings = DashboardSettings::new(Some(String::new()), Some(String::new()));
        assert_eq!(settings, DashboardSettings::default());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let settings = DashboardSettings::new(Some("https://adapt.example.com/".into()), None);
        assert_eq!(
            settings.endpoint_url(),
            "https://adapt.example.com/api/updateAdaptDetails"
        );
    }

    #[test]
    fn load_combines_session_and_settings() {
        let settings = DashboardSettings::new(
            Some("https://adapt.example.com".into()),
            Some("s3cret".into()),
        );
        let data = DashboardData::load("demo.myshopify.com", &settings);
        assert_eq!(data.shop, "demo.myshopify.com");
        assert_eq!(data.api_url, "https://adapt.example.com/api/updateAdaptDetails");
        assert_eq!(data.api_key, "s3cret");
    }

    #[test]
    fn example_body_embeds_shop() {
        let body = example_body("demo.myshopify.com");
        assert_eq!(
            body,
            "{\n  \"invoiceNumber\": \"1001\",\n  \"shop\": \"demo.myshopify.com\"\n}"
        );
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!({"invoiceNumber": "1001", "shop": "demo.myshopify.com"})
        );
    }

    #[test]
    fn loader_payload_is_camel_case() {
        let data = DashboardData::load("demo.myshopify.com", &DashboardSettings::default());
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["apiUrl"], "https://your-app.fly.dev/api/updateAdaptDetails");
        assert_eq!(value["apiKey"], "12345");
    }
}
