//! HTTP surface of the orchestrator agent.
//!
//! - GET  /.well-known/agent.json: the orchestrator's own Agent Card
//! - POST /a2a: `start_qos_chain` runs the chain and returns the final report
//! - GET  /health
//! - GET  /agents: directory listing

use crate::agents::START_CHAIN_CAPABILITY;
use crate::chain::ChainExecutor;
use crate::directory::AgentDirectory;
use crate::types::{A2AMessage, A2AResponse, AgentCard, JsonMap, A2A_PATH, AGENT_CARD_PATH};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

pub struct OrchestratorState {
    pub card: AgentCard,
    pub executor: Arc<ChainExecutor>,
    pub directory: AgentDirectory,
}

impl OrchestratorState {
    pub fn new(card: AgentCard, executor: Arc<ChainExecutor>, directory: AgentDirectory) -> Self {
        Self {
            card,
            executor,
            directory,
        }
    }
}

pub fn router(state: Arc<OrchestratorState>) -> Router {
    Router::new()
        .route(AGENT_CARD_PATH, get(handle_card))
        .route(A2A_PATH, post(handle_a2a))
        .route("/health", get(handle_health))
        .route("/agents", get(handle_agents))
        .with_state(state)
}

/// Serve until `shutdown` resolves. New chain runs are refused from that point on,
/// then the listener drains in-flight requests.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<OrchestratorState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let executor = state.executor.clone();
    let app = router(state);
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "orchestrator listening");
    }
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown.await;
            executor.begin_shutdown();
        })
        .await?;
    info!("orchestrator stopped");
    Ok(())
}

pub async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {}", err);
        return;
    }
    info!("Ctrl+C received, shutting down...");
}

async fn handle_card(State(state): State<Arc<OrchestratorState>>) -> Json<AgentCard> {
    Json(state.card.clone())
}

async fn handle_a2a(
    State(state): State<Arc<OrchestratorState>>,
    Json(message): Json<A2AMessage>,
) -> Json<A2AResponse> {
    info!(
        sender = %message.sender_id,
        capability = %message.payload.capability,
        "received A2A message"
    );
    if message.payload.capability != START_CHAIN_CAPABILITY {
        return Json(A2AResponse::failure("Invalid capability."));
    }

    let report = state.executor.run(message.payload.params).await;
    match serde_json::to_value(&report) {
        Ok(value) => {
            let mut result = JsonMap::new();
            result.insert("final_report".to_string(), value);
            Json(A2AResponse::success(result))
        }
        Err(e) => Json(A2AResponse::failure(format!(
            "Failed to encode final report: {}",
            e
        ))),
    }
}

async fn handle_health(State(state): State<Arc<OrchestratorState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "agent": state.card.name,
        "discovered": state.directory.len().await,
    }))
}

async fn handle_agents(State(state): State<Arc<OrchestratorState>>) -> impl IntoResponse {
    let agents: Vec<_> = state
        .directory
        .snapshot()
        .await
        .into_iter()
        .map(|card| {
            json!({
                "name": card.name,
                "endpoint": card.endpoint,
                "capabilities": card.capabilities.keys().collect::<Vec<_>>(),
            })
        })
        .collect();
    Json(json!({ "agents": agents }))
}
