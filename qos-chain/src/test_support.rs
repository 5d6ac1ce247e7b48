//! Recording stub transport shared by the unit tests.

use crate::error::TransportError;
use crate::transport::A2ATransport;
use crate::types::{A2AMessage, A2AResponse, AgentCard, Authentication, CapabilityDescriptor, JsonMap, CARD_VERSION};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

pub(crate) fn card(name: &str, port: u16, capabilities: &[&str]) -> AgentCard {
    AgentCard {
        version: CARD_VERSION.to_string(),
        name: name.to_string(),
        description: format!("{} (stub)", name),
        endpoint: format!("http://127.0.0.1:{}/a2a", port),
        authentication: Authentication::None,
        capabilities: capabilities
            .iter()
            .map(|c| {
                (
                    c.to_string(),
                    CapabilityDescriptor {
                        description: format!("{} capability", c),
                        parameters: BTreeMap::new(),
                        returns: BTreeMap::new(),
                    },
                )
            })
            .collect(),
        auth_token: None,
    }
}

pub(crate) fn json_map(value: JsonValue) -> JsonMap {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

fn refused(url: &str) -> TransportError {
    TransportError::Request {
        url: url.to_string(),
        message: "connection failed: Connection refused".to_string(),
    }
}

type Reply = Box<dyn Fn(&A2AMessage) -> Result<A2AResponse, TransportError> + Send + Sync>;

struct CardScript {
    failures_before_success: u32,
    card: Option<AgentCard>,
}

/// Scripted transport that records every probe and every call.
#[derive(Default)]
pub(crate) struct StubTransport {
    cards: Mutex<HashMap<String, CardScript>>,
    card_errors: Mutex<HashMap<String, TransportError>>,
    replies: Mutex<HashMap<String, Reply>>,
    probes: Mutex<Vec<String>>,
    calls: Mutex<Vec<A2AMessage>>,
}

impl StubTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve `card` at `url` after `failures` refused probes.
    pub(crate) fn card_after(&self, url: &str, failures: u32, card: AgentCard) {
        self.cards.lock().unwrap().insert(
            url.to_string(),
            CardScript {
                failures_before_success: failures,
                card: Some(card),
            },
        );
    }

    /// Answer every probe of `url` with `error`.
    pub(crate) fn card_fails_with(&self, url: &str, error: TransportError) {
        self.card_errors
            .lock()
            .unwrap()
            .insert(url.to_string(), error);
    }

    /// Reply to every call on `card`'s endpoint with `reply`.
    pub(crate) fn reply_with<F>(&self, card: &AgentCard, reply: F)
    where
        F: Fn(&A2AMessage) -> Result<A2AResponse, TransportError> + Send + Sync + 'static,
    {
        self.replies
            .lock()
            .unwrap()
            .insert(card.endpoint.clone(), Box::new(reply));
    }

    /// Reply with a fixed success result.
    pub(crate) fn succeed_with(&self, card: &AgentCard, result: JsonValue) {
        let result = json_map(result);
        self.reply_with(card, move |_| Ok(A2AResponse::success(result.clone())));
    }

    pub(crate) fn probe_count(&self, url: &str) -> usize {
        self.probes.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub(crate) fn calls(&self) -> Vec<A2AMessage> {
        self.calls.lock().unwrap().clone()
    }

    /// Receivers of all calls, in call order.
    pub(crate) fn call_order(&self) -> Vec<String> {
        self.calls().into_iter().map(|m| m.receiver_id).collect()
    }

    pub(crate) fn calls_to(&self, receiver: &str) -> usize {
        self.calls().iter().filter(|m| m.receiver_id == receiver).count()
    }
}

#[async_trait]
impl A2ATransport for StubTransport {
    async fn fetch_card(&self, card_url: &str) -> Result<AgentCard, TransportError> {
        self.probes.lock().unwrap().push(card_url.to_string());
        if let Some(error) = self.card_errors.lock().unwrap().get(card_url) {
            return Err(error.clone());
        }
        let seen = self.probe_count(card_url) as u32;
        let cards = self.cards.lock().unwrap();
        match cards.get(card_url) {
            Some(script) if seen > script.failures_before_success => {
                script.card.clone().ok_or_else(|| refused(card_url))
            }
            _ => Err(refused(card_url)),
        }
    }

    async fn send(
        &self,
        endpoint: &str,
        _auth_token: Option<&str>,
        message: &A2AMessage,
    ) -> Result<A2AResponse, TransportError> {
        self.calls.lock().unwrap().push(message.clone());
        let replies = self.replies.lock().unwrap();
        match replies.get(endpoint) {
            Some(reply) => reply(message),
            None => Err(refused(endpoint)),
        }
    }
}
