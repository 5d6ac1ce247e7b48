//! HTTP transport for Agent Card probes and A2A calls.

use crate::error::TransportError;
use crate::types::{A2AMessage, A2AResponse, AgentCard};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Stateless client for the two per-agent endpoints.
///
/// A non-2xx status is always an error here; the body-level `status` of an A2A
/// response is left for the caller to interpret.
#[async_trait]
pub trait A2ATransport: Send + Sync {
    /// GET the metadata endpoint at `card_url` and parse an Agent Card.
    async fn fetch_card(&self, card_url: &str) -> Result<AgentCard, TransportError>;

    /// POST one envelope to `endpoint`.
    async fn send(
        &self,
        endpoint: &str,
        auth_token: Option<&str>,
        message: &A2AMessage,
    ) -> Result<A2AResponse, TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportTimeouts {
    /// Bound on one discovery probe.
    pub probe: Duration,
    /// Bound on one capability call; remote stages may do slow work.
    pub invocation: Duration,
}

impl Default for TransportTimeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(3),
            invocation: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeouts: TransportTimeouts,
}

impl HttpTransport {
    pub fn new(timeouts: TransportTimeouts) -> Result<Self, TransportError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("QoS-Chain-Orchestrator/1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { client, timeouts })
    }

    pub fn timeouts(&self) -> TransportTimeouts {
        self.timeouts
    }

    fn checked(
        url: &str,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<reqwest::Response, TransportError> {
        let response = result.map_err(|e| TransportError::Request {
            url: url.to_string(),
            message: describe(&e),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl A2ATransport for HttpTransport {
    async fn fetch_card(&self, card_url: &str) -> Result<AgentCard, TransportError> {
        let sent = self
            .client
            .get(card_url)
            .timeout(self.timeouts.probe)
            .send()
            .await;
        let response = Self::checked(card_url, sent)?;

        let card: AgentCard = response.json().await.map_err(|e| TransportError::Decode {
            url: card_url.to_string(),
            message: e.to_string(),
        })?;
        card.validate().map_err(|message| TransportError::Decode {
            url: card_url.to_string(),
            message,
        })?;
        Ok(card)
    }

    async fn send(
        &self,
        endpoint: &str,
        auth_token: Option<&str>,
        message: &A2AMessage,
    ) -> Result<A2AResponse, TransportError> {
        debug!(
            receiver = %message.receiver_id,
            capability = %message.payload.capability,
            endpoint,
            "sending A2A message"
        );
        let mut request = self
            .client
            .post(endpoint)
            .json(message)
            .timeout(self.timeouts.invocation);
        if let Some(token) = auth_token {
            request = request.bearer_auth(token);
        }

        let response = Self::checked(endpoint, request.send().await)?;
        response.json().await.map_err(|e| TransportError::Decode {
            url: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
