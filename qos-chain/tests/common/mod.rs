//! In-process stub agents served over real HTTP on ephemeral ports.

#![allow(dead_code)]

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use qos_chain::agents::AgentProfile;
use qos_chain::types::{A2AMessage, AgentCard, A2A_PATH, AGENT_CARD_PATH};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub type Handler = Arc<dyn Fn(&HeaderMap, A2AMessage) -> (StatusCode, Value) + Send + Sync>;

pub struct StubAgent {
    pub card: AgentCard,
    pub card_url: String,
    calls: Arc<AtomicUsize>,
    auth_headers: Arc<Mutex<Vec<String>>>,
}

impl StubAgent {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn auth_headers(&self) -> Vec<String> {
        self.auth_headers.lock().unwrap().clone()
    }
}

pub async fn spawn_agent(name: &str, capability: &str, handler: Handler) -> StubAgent {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let profile = AgentProfile::new(name, port, format!("{} stub", name), capability);
    let card = profile.card("127.0.0.1");
    let card_url = profile.card_url("127.0.0.1");

    let calls = Arc::new(AtomicUsize::new(0));
    let auth_headers = Arc::new(Mutex::new(Vec::new()));

    let served_card = card.clone();
    let a2a = {
        let calls = calls.clone();
        let auth_headers = auth_headers.clone();
        move |headers: HeaderMap, Json(message): Json<A2AMessage>| {
            let calls = calls.clone();
            let auth_headers = auth_headers.clone();
            let handler = handler.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
                    auth_headers.lock().unwrap().push(value.to_string());
                }
                let (status, body) = handler(&headers, message);
                (status, Json(body))
            }
        }
    };
    let app = Router::new()
        .route(
            AGENT_CARD_PATH,
            get(move || {
                let card = served_card.clone();
                async move { Json(card) }
            }),
        )
        .route(A2A_PATH, post(a2a));

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    StubAgent {
        card,
        card_url,
        calls,
        auth_headers,
    }
}

/// Agent that always answers `{"status": "success", "result": result}`.
pub async fn spawn_success(name: &str, capability: &str, result: Value) -> StubAgent {
    spawn_agent(
        name,
        capability,
        Arc::new(move |_, _| (StatusCode::OK, json!({"status": "success", "result": result.clone()}))),
    )
    .await
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
