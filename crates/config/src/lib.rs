use adapt_dash_core::dashboard::DashboardSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const APP_NAME: &str = "adapt-dashboard";
const KEYCHAIN_SERVICE: &str = "adapt.dashboard.credentials";

pub const CONFIG_PATH_VAR: &str = "ADAPT_DASHBOARD_CONFIG";
pub const APP_URL_VAR: &str = "SHOPIFY_APP_URL";
pub const ADAPT_KEY_VAR: &str = "X_ADAPT_KEY";
pub const API_KEY_VAR: &str = "SHOPIFY_API_KEY";
pub const API_SECRET_VAR: &str = "SHOPIFY_API_SECRET";
pub const BIND_ADDR_VAR: &str = "BIND_ADDR";

pub const ADAPT_KEY_SECRET: &str = "x_adapt_key";
pub const API_SECRET_SECRET: &str = "shopify_api_secret";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSection {
    pub base_url: Option<String>,
    pub bind_addr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_kind")]
    pub kind: String, // "http" | "mock"
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider_kind() -> String {
    "http".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session token audience (the app's client id).
    pub api_key: Option<String>,
    /// Skip session tokens and treat every request as this shop. Local development only.
    pub dev_shop: Option<String>,
}

/// Values that live outside the config file: environment and keychain.
pub trait Lookup {
    fn var(&self, key: &str) -> Option<String>;
    fn secret(&self, key: &str) -> Option<String>;
}

/// Process environment plus the OS keychain.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl Lookup for SystemLookup {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn secret(&self, key: &str) -> Option<String> {
        match get_secret(key) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "no keychain entry");
                None
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Base URL and secret key shown on the dashboard, falling back to the
    /// documented defaults when nothing is configured.
    pub fn dashboard_settings(&self, lookup: &impl Lookup) -> DashboardSettings {
        let app_url = non_empty(lookup.var(APP_URL_VAR)).or_else(|| non_empty(self.app.base_url.clone()));
        DashboardSettings::new(app_url, self.adapt_key(lookup))
    }

    pub fn adapt_key(&self, lookup: &impl Lookup) -> Option<String> {
        non_empty(lookup.var(ADAPT_KEY_VAR)).or_else(|| non_empty(lookup.secret(ADAPT_KEY_SECRET)))
    }

    pub fn api_key(&self, lookup: &impl Lookup) -> Option<String> {
        non_empty(lookup.var(API_KEY_VAR)).or_else(|| non_empty(self.auth.api_key.clone()))
    }

    pub fn api_secret(&self, lookup: &impl Lookup) -> Option<String> {
        non_empty(lookup.var(API_SECRET_VAR)).or_else(|| non_empty(lookup.secret(API_SECRET_SECRET)))
    }

    pub fn bind_addr(&self, lookup: &impl Lookup) -> String {
        non_empty(lookup.var(BIND_ADDR_VAR))
            .or_else(|| non_empty(self.app.bind_addr.clone()))
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
    }
}

/// Load from `ADAPT_DASHBOARD_CONFIG` when set, otherwise from the platform config dir.
pub fn load() -> Result<AppConfig> {
    if let Some(path) = non_empty(std::env::var(CONFIG_PATH_VAR).ok()) {
        return load_from(path);
    }
    let cfg: AppConfig = confy::load(APP_NAME, None).context("Failed to load app config")?;
    Ok(cfg)
}

pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let cfg: AppConfig = confy::load_path(path)
        .with_context(|| format!("Failed to load app config from {}", path.display()))?;
    Ok(cfg)
}

/// Retrieve a secret from the OS keychain
pub fn get_secret(key: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, key)?;
    let password = entry.get_password()?;
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapLookup {
        vars: HashMap<&'static str, &'static str>,
        secrets: HashMap<&'static str, &'static str>,
    }

    impl Lookup for MapLookup {
        fn var(&self, key: &str) -> Option<String> {
            self.vars.get(key).map(|v| v.to_string())
        }

        fn secret(&self, key: &str) -> Option<String> {
            self.secrets.get(key).map(|v| v.to_string())
        }
    }

    #[test]
    fn nothing_configured_uses_fallbacks() {
        let settings = AppConfig::default().dashboard_settings(&MapLookup::default());
        assert_eq!(
            settings.endpoint_url(),
            "https://your-app.fly.dev/api/updateAdaptDetails"
        );
        assert_eq!(settings.adapt_key, "12345");
    }

    #[test]
    fn environment_beats_config_file() {
        let mut cfg = AppConfig::default();
        cfg.app.base_url = Some("https://from-file.example.com".into());
        let lookup = MapLookup {
            vars: HashMap::from([
                (APP_URL_VAR, "https://from-env.example.com"),
                (ADAPT_KEY_VAR, "env-key"),
            ]),
            ..Default::default()
        };
        let settings = cfg.dashboard_settings(&lookup);
        assert_eq!(settings.app_url, "https://from-env.example.com");
        assert_eq!(settings.adapt_key, "env-key");
    }

    #[test]
    fn empty_environment_falls_through() {
        let mut cfg = AppConfig::default();
        cfg.app.base_url = Some("https://from-file.example.com".into());
        let lookup = MapLookup {
            vars: HashMap::from([(APP_URL_VAR, ""), (ADAPT_KEY_VAR, "")]),
            secrets: HashMap::from([(ADAPT_KEY_SECRET, "keychain-key")]),
        };
        let settings = cfg.dashboard_settings(&lookup);
        assert_eq!(settings.app_url, "https://from-file.example.com");
        assert_eq!(settings.adapt_key, "keychain-key");
    }

    #[test]
    fn bind_addr_default() {
        assert_eq!(
            AppConfig::default().bind_addr(&MapLookup::default()),
            "127.0.0.1:3000"
        );
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{"provider":{"kind":"mock"}}"#).unwrap();
        assert_eq!(cfg.provider.kind, "mock");
        assert_eq!(cfg.provider.timeout_secs, 30);
        assert!(cfg.auth.dev_shop.is_none());
    }
}
