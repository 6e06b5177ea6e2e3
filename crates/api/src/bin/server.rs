//! API server entry point
//!
//! Loads configuration, wires the agent network (LLM client, product
//! retriever, Yelp directory, A2A broker, HITL coordinator) and starts
//! the Axum server.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use beauty_agent_a2a::MessageBroker;
use beauty_agent_api::{ApiServer, AppState};
use beauty_agent_common::{init_tracing_with_level, SystemConfig};
use beauty_agent_hitl::{policies, HitlCapability, HitlCoordinator};
use beauty_agent_network::{
    BusinessAgent, ChatCompletionsClient, ProductAgent, StaticRetriever, SupervisorAgent,
    YelpClient,
};

#[derive(Parser)]
#[command(name = "beauty-server")]
#[command(version = "0.1.0")]
#[command(about = "Beauty concierge API server with human-in-the-loop review")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Host to bind to (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(&cli.log_level)?;

    let mut config = SystemConfig::load(&cli.config)?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    info!("Configuration loaded from {}", cli.config);

    let state = build_state(&config)?;
    ApiServer::new(state, &config.server.host, config.server.port)
        .run()
        .await
}

/// Assemble the coordinator, broker and agents from configuration.
fn build_state(config: &SystemConfig) -> Result<AppState> {
    let coordinator = Arc::new(HitlCoordinator::with_default_policy());
    for name in &config.hitl.policies {
        match policies::by_name(name) {
            Some(policy) => {
                if let Err(e) = coordinator.add_policy(policy) {
                    warn!("Skipping policy '{}': {}", name, e);
                }
            }
            None => warn!("Unknown policy '{}' in configuration, skipping", name),
        }
    }
    info!(
        enabled = config.hitl.enabled,
        policies = coordinator.policies().len(),
        "HITL coordinator ready"
    );

    let llm = Arc::new(ChatCompletionsClient::new(&config.llm, config.llm_api_key()));

    let retriever = match &config.retrieval.knowledge_path {
        Some(path) => Arc::new(StaticRetriever::from_json_file(Path::new(path))?),
        None => Arc::new(StaticRetriever::with_builtin_catalog()),
    };

    let broker = Arc::new(MessageBroker::new());

    let product = Arc::new(ProductAgent::new(
        "product-agent",
        llm.clone(),
        retriever,
        config.retrieval.top_k,
    ));
    broker.register_agent(product.profile(), product.clone());

    match YelpClient::new(&config.yelp) {
        Ok(directory) => {
            let business = Arc::new(BusinessAgent::new(
                "business-agent",
                llm,
                Arc::new(directory),
                &config.yelp.default_location,
                config.yelp.default_limit,
            ));
            broker.register_agent(business.profile(), business.clone());
        }
        Err(e) => {
            warn!("Business search disabled: {}", e);
        }
    }

    let hitl = HitlCapability::new("supervisor", coordinator.clone(), config.hitl.enabled);
    let supervisor = Arc::new(SupervisorAgent::new("supervisor", broker.clone(), hitl));

    info!(agents = broker.list_agents().len(), "Agent network wired");

    Ok(AppState {
        coordinator,
        broker,
        supervisor,
    })
}
