use anyhow::Result;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::dashboard::{resolve_snapshot, DashboardData, DashboardSnapshot};
use crate::models::TxSource;
use crate::poller::HookHandle;

#[derive(Clone)]
pub struct AppState {
    pub source: TxSource,
    pub dashboard: HookHandle<DashboardData>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    let hook_state = state.dashboard.snapshot();
    Json(resolve_snapshot(state.source, &hook_state))
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dashboard", get(dashboard))
        .with_state(state)
}

pub async fn run_http_server(addr: &str, state: AppState) -> Result<()> {
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
