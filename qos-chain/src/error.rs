//! Error taxonomy for discovery, invocation and configuration.
//!
//! Chain-level classification lives in [`crate::chain::ChainAbort`]; everything here
//! is produced below the executor and converted into a report there.

use std::path::PathBuf;
use thiserror::Error;

/// Network or HTTP-level failure talking to one endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid response body from {url}: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    /// Connection problems and error statuses may clear once the agent is up; a
    /// client or decode failure will not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::Request { .. } | TransportError::Status { .. }
        )
    }
}

/// A known endpoint never became reachable within the retry budget.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to discover agent at {endpoint_url} after {attempts} attempts. Error: {last_error}")]
pub struct DiscoveryError {
    pub endpoint_url: String,
    pub attempts: u32,
    pub last_error: TransportError,
}

/// Failure of a single capability call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvocationError {
    /// The service was never discovered, or does not advertise the capability.
    #[error("Agent {service} cannot serve '{capability}': {reason}")]
    CapabilityNotFound {
        service: String,
        capability: String,
        reason: String,
    },

    #[error("A2A communication failed with {service}: {source}")]
    Transport {
        service: String,
        #[source]
        source: TransportError,
    },

    /// The remote stage ran and reported an internal failure.
    #[error("Remote agent {service} failed execution: {message}")]
    RemoteExecution { service: String, message: String },
}

impl InvocationError {
    pub fn service(&self) -> &str {
        match self {
            InvocationError::CapabilityNotFound { service, .. }
            | InvocationError::Transport { service, .. }
            | InvocationError::RemoteExecution { service, .. } => service,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse topology {path}: {source}")]
    Topology {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
