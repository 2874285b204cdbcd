use crate::engine::ReloadController;
use anyhow::{Context, Result};
use axum::{
    extract::{Json as AxumJson, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

struct ApiState {
    controller: Arc<ReloadController>,
    path_sender: watch::Sender<String>,
}

pub fn router(controller: Arc<ReloadController>, path_sender: watch::Sender<String>) -> Router {
    let state = Arc::new(ApiState {
        controller,
        path_sender,
    });

    Router::new()
        .route("/api/customlists/update", post(trigger_update))
        .route("/api/customlists/status", get(get_status))
        .route("/api/customlists/config", post(set_file_path))
        .route("/api/customlists/lookup", get(lookup))
        .with_state(state)
}

pub async fn start_api_server(
    controller: Arc<ReloadController>,
    path_sender: watch::Sender<String>,
    addr: SocketAddr,
) -> Result<()> {
    let app = router(controller, path_sender);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;
    tracing::info!("API Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("API server failed")
}

async fn trigger_update(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    // Outcome is only logged; the trigger itself always succeeds.
    let _ = state.controller.check_and_update().await;
    Json(serde_json::json!({
        "status": "ok",
        "message": "Custom filter list loaded successfully."
    }))
}

async fn get_status(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let summary = state.controller.store().snapshot().summary();
    let next_check_secs = state
        .controller
        .next_check()
        .await
        .map(|at| at.saturating_duration_since(Instant::now()).as_secs());

    Json(serde_json::json!({
        "list": summary,
        "next_check_secs": next_check_secs
    }))
}

#[derive(Deserialize)]
struct SetPathRequest {
    file_path: String,
}

async fn set_file_path(
    State(state): State<Arc<ApiState>>,
    AxumJson(payload): AxumJson<SetPathRequest>,
) -> impl IntoResponse {
    let file_path = payload.file_path.trim().to_string();
    state.path_sender.send_replace(file_path.clone());
    Json(serde_json::json!({ "status": "ok", "file_path": file_path }))
}

#[derive(Deserialize)]
struct LookupQuery {
    ip: Option<IpAddr>,
    domain: Option<String>,
    #[serde(default)]
    subdomains: bool,
    asn: Option<u32>,
    country: Option<String>,
}

async fn lookup(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<LookupQuery>,
) -> impl IntoResponse {
    // One snapshot for the whole request.
    let lists = state.controller.store().snapshot();

    let (listed, matched) = if let Some(ip) = query.ip {
        (lists.contains_ip(ip), None)
    } else if let Some(domain) = query.domain {
        let matched = lists.match_domain(&domain, query.subdomains);
        (matched.is_some(), matched)
    } else if let Some(asn) = query.asn {
        (lists.contains_asn(asn), None)
    } else if let Some(country) = query.country {
        (lists.contains_country(&country), None)
    } else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "expected one of ip, domain, asn, country" })),
        );
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({ "listed": listed, "matched": matched })),
    )
}
