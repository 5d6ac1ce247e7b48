//! Agent discovery: resolve Agent Card URLs into directory entries.
//!
//! Agents start concurrently and in any order, so a refused probe is expected
//! during start-up. Each target is probed with a bounded retry; a target that
//! never answers is reported and skipped so the rest can still be discovered.

use crate::directory::AgentDirectory;
use crate::error::{DiscoveryError, TransportError};
use crate::transport::A2ATransport;
use crate::types::AgentCard;
use crate::utils::retry::{attempt_while, RetryPolicy};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One agent the orchestrator expects to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryTarget {
    /// Name used in logs; the directory key is the name the card reports.
    pub name: String,
    pub card_url: String,
    /// Bearer token attached to the resolved entry, if the agent requires one.
    pub auth_token: Option<String>,
}

impl DiscoveryTarget {
    pub fn new(name: impl Into<String>, card_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            card_url: card_url.into(),
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

/// Outcome of discovering a list of targets.
#[derive(Debug, Default)]
pub struct DiscoverySummary {
    pub discovered: Vec<String>,
    pub failed: Vec<(String, DiscoveryError)>,
}

impl DiscoverySummary {
    pub fn all_discovered(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct DiscoveryService {
    transport: Arc<dyn A2ATransport>,
    directory: AgentDirectory,
    policy: RetryPolicy,
}

impl DiscoveryService {
    pub fn new(
        transport: Arc<dyn A2ATransport>,
        directory: AgentDirectory,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            directory,
            policy,
        }
    }

    pub fn directory(&self) -> &AgentDirectory {
        &self.directory
    }

    /// Probe `card_url` until an Agent Card is returned, then record it,
    /// replacing any previous entry with the same name.
    pub async fn discover(&self, card_url: &str) -> Result<AgentCard, DiscoveryError> {
        self.discover_with_token(card_url, None).await
    }

    async fn discover_with_token(
        &self,
        card_url: &str,
        auth_token: Option<String>,
    ) -> Result<AgentCard, DiscoveryError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let transport = &self.transport;
        let result = attempt_while(
            self.policy,
            move |n| {
                debug!(card_url, attempt = n, max_attempts, "discovering agent card");
                transport.fetch_card(card_url)
            },
            TransportError::is_transient,
        )
        .await;

        match result {
            Ok(mut card) => {
                card.auth_token = auth_token;
                if self.directory.insert(card.clone()).await.is_some() {
                    info!(agent = %card.name, endpoint = %card.endpoint, "re-discovered agent, entry replaced");
                } else {
                    info!(agent = %card.name, endpoint = %card.endpoint, "discovered agent");
                }
                Ok(card)
            }
            Err(exhausted) => {
                let err = DiscoveryError {
                    endpoint_url: card_url.to_string(),
                    attempts: exhausted.attempts,
                    last_error: exhausted.last_error,
                };
                warn!(card_url, attempts = err.attempts, error = %err.last_error, "agent discovery failed");
                Err(err)
            }
        }
    }

    /// Discover every target in order. Failures are logged and collected; they
    /// never stop the remaining targets from being probed.
    pub async fn discover_all(&self, targets: &[DiscoveryTarget]) -> DiscoverySummary {
        info!(targets = targets.len(), "starting agent discovery");
        let mut summary = DiscoverySummary::default();
        for target in targets {
            match self
                .discover_with_token(&target.card_url, target.auth_token.clone())
                .await
            {
                Ok(card) => summary.discovered.push(card.name),
                Err(e) => {
                    warn!(agent = %target.name, "discovery FAILED: {}", e);
                    summary.failed.push((target.name.clone(), e));
                }
            }
        }
        info!(
            discovered = ?summary.discovered,
            failed = summary.failed.len(),
            "agent discovery complete"
        );
        summary
    }
}
