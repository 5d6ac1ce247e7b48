//! Capability invocation over A2A.

use crate::directory::AgentDirectory;
use crate::error::InvocationError;
use crate::transport::A2ATransport;
use crate::types::{A2AMessage, InvocationResult, JsonMap};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// The one interface every pipeline stage is driven through.
#[async_trait]
pub trait CapabilityInvocation: Send + Sync {
    async fn invoke(
        &self,
        service: &str,
        capability: &str,
        params: JsonMap,
    ) -> Result<JsonMap, InvocationError>;
}

/// Invokes capabilities on agents resolved through the directory.
///
/// There is no retry here: a call that fails once the agent has been discovered
/// is a real failure, not a start-up race.
pub struct CapabilityInvoker {
    sender_id: String,
    directory: AgentDirectory,
    transport: Arc<dyn A2ATransport>,
}

impl CapabilityInvoker {
    pub fn new(
        sender_id: impl Into<String>,
        directory: AgentDirectory,
        transport: Arc<dyn A2ATransport>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            directory,
            transport,
        }
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }
}

#[async_trait]
impl CapabilityInvocation for CapabilityInvoker {
    async fn invoke(
        &self,
        service: &str,
        capability: &str,
        params: JsonMap,
    ) -> Result<JsonMap, InvocationError> {
        let not_found = |reason: &str| InvocationError::CapabilityNotFound {
            service: service.to_string(),
            capability: capability.to_string(),
            reason: reason.to_string(),
        };

        let card = self
            .directory
            .get(service)
            .await
            .ok_or_else(|| not_found("agent not discovered"))?;
        if !card.supports(capability) {
            return Err(not_found("capability not advertised"));
        }

        let message = A2AMessage::new(&self.sender_id, &card.name, capability, params);
        info!(agent = %card.name, endpoint = %card.endpoint, capability, "invoking capability");

        let response = self
            .transport
            .send(&card.endpoint, card.auth_token.as_deref(), &message)
            .await
            .map_err(|source| {
                warn!(agent = %card.name, error = %source, "A2A transport failure");
                InvocationError::Transport {
                    service: service.to_string(),
                    source,
                }
            })?;

        match response.into_result() {
            InvocationResult::Success(result) => Ok(result),
            InvocationResult::Failure(message) => {
                warn!(agent = %card.name, error = %message, "remote agent reported failure");
                Err(InvocationError::RemoteExecution {
                    service: service.to_string(),
                    message,
                })
            }
        }
    }
}
