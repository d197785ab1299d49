use anyhow::Context;
use axum::{
    extract::State,
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

mod broadcast;
mod config;
mod deck;
mod declaration;
mod error;
mod hand_size;
mod handlers;
mod lifecycle;
mod scoring;
mod session;
mod store;
mod telemetry;
mod tricks;
mod turns;
mod ws;
#[cfg(test)]
mod tests;

use config::{CorsOrigin, ServerConfig};
use store::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            store: Arc::new(SessionStore::new()),
            started_at: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = ServerConfig::from_env().context("reading server configuration")?;
    telemetry::init_tracing(cfg.log_format);

    let app = build_router(AppState::new(), &cfg)?;

    let addr = cfg.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "server listening on ws://{addr}/ws");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

pub fn build_router(state: AppState, cfg: &ServerConfig) -> anyhow::Result<Router> {
    let origin = match &cfg.cors_origin {
        CorsOrigin::Any => AllowOrigin::from(Any),
        CorsOrigin::Exact(o) => AllowOrigin::exact(
            HeaderValue::from_str(o).with_context(|| format!("CORS origin {o:?}"))?,
        ),
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST]);

    Ok(Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/ws", get(ws::ws_handler))
        .layer(cors)
        .with_state(state))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.store.len(),
        "started_at": state.started_at.to_rfc3339(),
    }))
}
