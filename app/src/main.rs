use adapt_dash_core::dashboard::DashboardSettings;
use adapt_dashboard::{
    auth::{DevShopAuth, SessionAuthenticator, SessionTokenAuth},
    router, AppState,
};
use config::{AppConfig, SystemLookup};
use fulfillment::{http::HttpFulfillmentClient, mock::MockClient, FulfillmentClient};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "info,adapt_dashboard=info";

fn init_tracing() {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn create_fulfillment_client(
    cfg: &AppConfig,
    settings: &DashboardSettings,
) -> anyhow::Result<Arc<dyn FulfillmentClient>> {
    match cfg.provider.kind.as_str() {
        "mock" => {
            tracing::info!("Using mock fulfillment endpoint");
            Ok(MockClient::with_latency(Duration::from_millis(200)))
        }
        "http" => {
            tracing::info!(endpoint = %settings.endpoint_url(), "Using HTTP fulfillment endpoint");
            let timeout = Duration::from_secs(cfg.provider.timeout_secs);
            Ok(HttpFulfillmentClient::new(settings, timeout)?)
        }
        other => anyhow::bail!("Unknown fulfillment provider kind: {other}"),
    }
}

fn create_authenticator(cfg: &AppConfig) -> anyhow::Result<Arc<dyn SessionAuthenticator>> {
    if let Some(shop) = cfg.auth.dev_shop.as_deref().filter(|s| !s.is_empty()) {
        tracing::warn!(%shop, "Session tokens disabled, every request is treated as the dev shop");
        return Ok(Arc::new(DevShopAuth::new(shop)));
    }

    let api_key = cfg
        .api_key(&SystemLookup)
        .ok_or_else(|| anyhow::anyhow!("SHOPIFY_API_KEY not configured"))?;
    let api_secret = cfg
        .api_secret(&SystemLookup)
        .ok_or_else(|| anyhow::anyhow!("SHOPIFY_API_SECRET not found in env or keychain"))?;
    Ok(Arc::new(SessionTokenAuth::new(&api_key, &api_secret)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cfg = config::load().unwrap_or_else(|e| {
        let detail = format!("{e:#}");
        tracing::warn!(error = %detail, "Falling back to default config");
        AppConfig::default()
    });
    let settings = cfg.dashboard_settings(&SystemLookup);
    let client = create_fulfillment_client(&cfg, &settings)?;
    let auth = create_authenticator(&cfg)?;

    let addr: SocketAddr = cfg
        .bind_addr(&SystemLookup)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address, expected host:port: {e}"))?;

    let api_key = cfg.api_key(&SystemLookup);
    let app = router(AppState::new(settings, client, auth).with_api_key(api_key));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Dashboard listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_names_this_crate() {
        let target = format!("{}=", env!("CARGO_CRATE_NAME"));
        assert!(DEFAULT_LOG_FILTER.split(',').any(|d| d.starts_with(&target)));
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
