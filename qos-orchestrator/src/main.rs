//! QoS Orchestrator - discovers the QoS agents and serves the `start_qos_chain` capability.

use anyhow::Context;
use clap::Parser;
use qos_chain::agents::orchestrator_profile;
use qos_chain::pipeline::qos_pipeline;
use qos_chain::server::{serve, shutdown_signal, OrchestratorState};
use qos_chain::{
    AgentDirectory, CapabilityInvoker, ChainExecutor, DiscoveryService, HttpTransport,
    OrchestratorConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qos-orchestrator")]
#[command(about = "QoS repair chain orchestrator")]
struct Args {
    /// Path to the TOML configuration file (defaults are used when omitted)
    #[arg(long, env = "QOS_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind and to advertise on the orchestrator's card
    #[arg(long, env = "QOS_HOST")]
    host: Option<String>,

    #[arg(long, env = "QOS_PORT")]
    port: Option<u16>,

    /// Network topology JSON handed to the remediation agent
    #[arg(long, env = "QOS_TOPOLOGY")]
    topology: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "QOS_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<OrchestratorConfig> {
        let mut config = match &self.config {
            Some(path) => OrchestratorConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => OrchestratorConfig::default(),
        };
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(topology) = &self.topology {
            config.topology_path = topology.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config = args.load_config()?;
    info!("QoS Orchestrator starting...");
    if let Some(path) = &args.config {
        info!("Using configuration: {}", path.display());
    }

    // The remediation stage cannot run without a topology.
    let topology = config
        .load_topology()
        .context("topology is required to run the QoS chain")?;

    let transport = Arc::new(HttpTransport::new(config.timeouts())?);
    let directory = AgentDirectory::new();

    let discovery = DiscoveryService::new(transport.clone(), directory.clone(), config.retry_policy());
    let summary = discovery.discover_all(&config.targets()).await;
    for (name, err) in &summary.failed {
        warn!("{} is offline: {}", name, err);
    }
    info!(
        "Discovered {}/{} agents",
        summary.discovered.len(),
        config.agents.len()
    );

    let invoker = CapabilityInvoker::new(&config.agent_name, directory.clone(), transport);
    let executor = Arc::new(ChainExecutor::new(
        qos_pipeline(topology),
        directory.clone(),
        Arc::new(invoker),
    ));
    let card = orchestrator_profile(&config.agent_name, config.port).card(&config.host);
    let state = Arc::new(OrchestratorState::new(card, executor, directory));

    let addr = config.bind_address();
    let listener = TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Starting {} on http://{}/a2a", config.agent_name, addr);

    serve(listener, state, shutdown_signal()).await?;
    Ok(())
}
