use adapt_dash_core::{
    dashboard::DashboardData,
    models::Notification,
    tester::{Completion, Submission, TesterPhase},
};
use anyhow::anyhow;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{auth::Session, error::AppError, render, state::AppState};

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Html<String> {
    let data = DashboardData::load(&session.shop, &state.settings);
    let tester = state.tester_view(&session.shop).await;
    Html(render::dashboard_page(&data, &tester, state.api_key.as_deref()))
}

pub async fn dashboard_data(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<DashboardData> {
    Json(DashboardData::load(&session.shop, &state.settings))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualTestForm {
    pub invoice_number: String,
    pub shop: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualTestReply {
    pub phase: TesterPhase,
    pub notification: Option<Notification>,
    pub stale: bool,
}

pub async fn manual_test(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(form): Json<ManualTestForm>,
) -> Result<Json<ManualTestReply>, AppError> {
    if form.shop.as_deref().is_some_and(|shop| shop != session.shop) {
        return Err(AppError::ShopMismatch);
    }

    let submission = {
        let mut testers = state.testers.lock().await;
        let tester = testers.entry(session.shop.clone()).or_default();
        tester.set_input(form.invoice_number);
        tester.begin(&session.shop)?
    };
    info!(
        shop = %session.shop,
        invoice = %submission.request.invoice_number,
        ticket = submission.ticket,
        "manual fulfillment test submitted"
    );

    // The transition back out of `Submitting` must happen even if the caller
    // goes away, so the round trip runs detached from this request.
    let task = tokio::spawn(settle(state, session.shop, submission));
    let reply = task
        .await
        .map_err(|e| AppError::Upstream(anyhow!("fulfillment task failed: {e}")))??;
    Ok(Json(reply))
}

async fn settle(
    state: AppState,
    shop: String,
    submission: Submission,
) -> Result<ManualTestReply, AppError> {
    let result = state.client.update_adapt_details(&submission.request).await;

    let mut testers = state.testers.lock().await;
    let tester = testers.entry(shop.clone()).or_default();
    let reply = match result {
        Ok(response) => {
            let (notification, stale) = match tester.complete(submission.ticket, &response) {
                Completion::Applied(notification) => (notification, false),
                Completion::Stale => (None, true),
            };
            info!(shop = %shop, ticket = submission.ticket, phase = ?tester.phase(), stale, "manual fulfillment test finished");
            Ok(ManualTestReply {
                phase: tester.phase(),
                notification,
                stale,
            })
        }
        Err(e) => {
            tester.abandon(submission.ticket);
            let detail = format!("{e:#}");
            error!(shop = %shop, ticket = submission.ticket, error = %detail, "manual fulfillment test failed");
            Err(AppError::Upstream(e))
        }
    };

    // Nothing pending means nothing a page load could show.
    if tester.in_flight() == 0 {
        testers.remove(&shop);
    }
    reply
}
