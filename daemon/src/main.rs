//! Coldlink daemon — entry point for running the relay.
//!
//! Configuration precedence: a TOML file (`--config`) is the base; CLI
//! flags and `COLDLINK_*` environment variables override it. Without a
//! file, the node endpoint, contract address, and signer must come from
//! flags or the environment — a missing required value is fatal, the
//! process never half-starts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use coldlink_api::{ApiServer, ApiState};
use coldlink_commands::CommandRelay;
use coldlink_evm::{EvmEndpoint, EvmSubmitter};
use coldlink_gateway::ViewerServer;
use coldlink_relay::hub::shared_hub;
use coldlink_relay::{
    init_logging, EvmChainLink, RelayConfig, RelayMetrics, RelaySupervisor, ShutdownController,
};

/// Grace period for the supervisor to wind down after the shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "coldlink-daemon", about = "Smart-fridge chain relay daemon")]
struct Cli {
    /// WebSocket JSON-RPC endpoint of the chain node (ws:// or wss://).
    #[arg(long, env = "COLDLINK_RPC_WS_URL")]
    rpc_ws_url: Option<String>,

    /// Address of the refrigeration controller contract.
    #[arg(long, env = "COLDLINK_CONTRACT_ADDRESS")]
    contract_address: Option<String>,

    /// Node-managed account that signs setpoint transactions.
    #[arg(long, env = "COLDLINK_SIGNER_ADDRESS")]
    signer_address: Option<String>,

    /// Port for the viewer WebSocket server.
    #[arg(long, env = "COLDLINK_VIEWER_PORT")]
    viewer_port: Option<u16>,

    /// Port for the command HTTP API.
    #[arg(long, env = "COLDLINK_API_PORT")]
    api_port: Option<u16>,

    /// Log format: "human" or "json".
    #[arg(long, env = "COLDLINK_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "COLDLINK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Expose the Prometheus metrics endpoint.
    #[arg(long, env = "COLDLINK_ENABLE_METRICS")]
    metrics: bool,

    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the relay.
    Run,
}

fn resolve_config(cli: &Cli) -> anyhow::Result<RelayConfig> {
    let file_config = match &cli.config {
        Some(path) => {
            let path = path.to_str().context("config path is not valid UTF-8")?;
            Some(RelayConfig::from_toml_file(path).context("failed to load config file")?)
        }
        None => None,
    };

    let config = match file_config {
        Some(base) => RelayConfig {
            rpc_ws_url: cli.rpc_ws_url.clone().unwrap_or(base.rpc_ws_url),
            contract_address: cli.contract_address.clone().unwrap_or(base.contract_address),
            signer_address: cli.signer_address.clone().unwrap_or(base.signer_address),
            viewer_port: cli.viewer_port.unwrap_or(base.viewer_port),
            api_port: cli.api_port.unwrap_or(base.api_port),
            log_format: cli.log_format.clone().unwrap_or(base.log_format),
            log_level: cli.log_level.clone().unwrap_or(base.log_level),
            enable_metrics: cli.metrics || base.enable_metrics,
        },
        None => RelayConfig {
            rpc_ws_url: cli
                .rpc_ws_url
                .clone()
                .context("--rpc-ws-url (or COLDLINK_RPC_WS_URL) is required")?,
            contract_address: cli
                .contract_address
                .clone()
                .context("--contract-address (or COLDLINK_CONTRACT_ADDRESS) is required")?,
            signer_address: cli
                .signer_address
                .clone()
                .context("--signer-address (or COLDLINK_SIGNER_ADDRESS) is required")?,
            viewer_port: cli.viewer_port.unwrap_or(8080),
            api_port: cli.api_port.unwrap_or(3000),
            log_format: cli.log_format.clone().unwrap_or_else(|| "human".into()),
            log_level: cli.log_level.clone().unwrap_or_else(|| "info".into()),
            enable_metrics: cli.metrics,
        },
    };

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let format = config
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_logging(format, &config.log_level);

    match cli.command {
        Command::Run => run(config).await,
    }
}

async fn run(config: RelayConfig) -> anyhow::Result<()> {
    info!(
        "starting coldlink relay (node {}, viewers :{}, commands :{})",
        config.rpc_ws_url, config.viewer_port, config.api_port
    );

    let metrics = Arc::new(RelayMetrics::new());
    let hub = shared_hub();
    let shutdown = Arc::new(ShutdownController::new());

    // Read path: supervised subscription → normalizer → hub.
    let endpoint = EvmEndpoint::new(&config.rpc_ws_url, &config.contract_address)?;
    let link = Arc::new(EvmChainLink::new(endpoint));
    let supervisor = RelaySupervisor::new(
        link,
        Arc::clone(&hub),
        Arc::clone(&metrics),
        shutdown.subscribe(),
    );
    let supervisor_task = tokio::spawn(supervisor.run());

    // Write path: its own connections, independent of the subscription.
    let contract = coldlink_evm::connection::parse_address(&config.contract_address)?;
    let signer = coldlink_evm::connection::parse_address(&config.signer_address)?;
    let submitter = Arc::new(EvmSubmitter::new(&config.rpc_ws_url, contract, signer));
    let commands = Arc::new(CommandRelay::new(submitter));

    let viewer_server =
        ViewerServer::new(config.viewer_port, Arc::clone(&hub), Arc::clone(&metrics));
    let mut viewer_task = tokio::spawn(async move { viewer_server.start().await });

    let api_server = ApiServer::new(
        config.api_port,
        ApiState {
            commands,
            metrics: Arc::clone(&metrics),
            expose_metrics: config.enable_metrics,
        },
    );
    let mut api_task = tokio::spawn(async move { api_server.start().await });

    // A server falling over is as fatal as an operator signal.
    tokio::select! {
        _ = shutdown.wait_for_signal() => {}
        result = &mut viewer_task => {
            error!(?result, "viewer server stopped unexpectedly");
            shutdown.trigger();
        }
        result = &mut api_task => {
            error!(?result, "command API stopped unexpectedly");
            shutdown.trigger();
        }
    }

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, supervisor_task)
        .await
        .is_err()
    {
        error!("supervisor did not stop within the shutdown timeout");
    }
    viewer_task.abort();
    api_task.abort();

    info!("coldlink daemon exited cleanly");
    Ok(())
}
