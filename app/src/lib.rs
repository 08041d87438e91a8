use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod error;
pub mod handlers;
pub mod render;
pub mod state;

pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let app = Router::new()
        .route("/app/dashboard", get(handlers::dashboard))
        .route("/app/dashboard.json", get(handlers::dashboard_data))
        .route(render::TEST_ACTION_PATH, post(handlers::manual_test))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(app)
        .with_state(state)
}
