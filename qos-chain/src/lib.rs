// QoS chain library
// Agent discovery, capability invocation over A2A, and the sequential QoS repair chain

pub mod agents;
pub mod chain;
pub mod config;
pub mod directory;
pub mod discovery;
pub mod error;
pub mod invoker;
pub mod pipeline;
#[cfg(feature = "server")]
pub mod server;
pub mod transport;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use chain::{ChainExecutor, ChainRunReport, FailureKind, Outcome, Pipeline, PipelineStage};
pub use config::OrchestratorConfig;
pub use directory::AgentDirectory;
pub use discovery::{DiscoveryService, DiscoverySummary, DiscoveryTarget};
pub use error::{ConfigError, DiscoveryError, InvocationError, TransportError};
pub use invoker::{CapabilityInvocation, CapabilityInvoker};
pub use transport::{A2ATransport, HttpTransport, TransportTimeouts};
pub use types::{A2AMessage, A2AResponse, AgentCard, JsonMap};
