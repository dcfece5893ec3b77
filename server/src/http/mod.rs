// HTTP handlers and routing.

use axum::extract::State as AxumState;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::app::AppState;
use crate::utils::now_epoch_ms;
use crate::ws::ws_handler;

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/clients", get(get_clients))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn get_clients(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let snapshot = app_state.hub.read().await.slots.snapshot(now_epoch_ms());
    Json(snapshot)
}
