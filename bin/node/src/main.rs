//! The mock node binary.
//!
//! Loads a TOML configuration, populates the fabricated chain, and serves the
//! `eth` JSON-RPC namespace over it.
//!
//! ## Usage
//!
//! ```sh
//! mockchain-node --config config.toml
//! ```
//!
//! - `-c` or `--config`: Path to the TOML configuration file
//! - `-p` or `--port`: Override the configured listen port
//! - `-v`: Verbosity level (0-2)

use anyhow::Context;
use clap::{ArgAction, Parser};
use mockchain_config::{Mode, ServerConfig};
use mockchain_core::{
    ChainFacade, ChainState, DefaultChainFacade, ForkRule, MAIN_FORK, PopulationEngine,
    RandomFill, Rule, ScheduledTransfers, TickRule,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// The mock node command.
#[derive(Parser, Debug, Clone)]
#[command(about = "Runs the mock Ethereum node", version)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, default_value = "config.toml")]
    config: PathBuf,
    /// Override the configured listen port.
    #[arg(long, short)]
    port: Option<u16>,
    /// Verbosity level (0-2)
    #[arg(short, action = ArgAction::Count)]
    v: u8,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Wires the population rules from the configuration and runs initial
/// population.
fn build_facade(config: &ServerConfig) -> anyhow::Result<DefaultChainFacade> {
    let forks = config.fork_events()?;

    let fork_rule = ForkRule::new(forks.clone());
    fork_rule.attach(ScheduledTransfers::new(config.contract_address, &forks));
    fork_rule.attach(RandomFill::new(config.random_fill, config.contract_address));

    let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(fork_rule)];
    if config.has_mode(Mode::Ticking) {
        let starting = forks.get(MAIN_FORK).map_or(0, |fork| fork.start_number);
        rules.push(Box::new(TickRule::new(config.block_time, starting)));
    }

    let state = Arc::new(ChainState::new());
    let engine = PopulationEngine::new(Arc::clone(&state), rules);
    DefaultChainFacade::new(engine, state).context("initial chain population failed")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.v);

    let config = ServerConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    info!(
        forks = config.forks.len(),
        transfers = config.transfers.len(),
        modes = ?config.modes,
        "configuration loaded"
    );

    let facade: Arc<dyn ChainFacade> = Arc::new(build_facade(&config)?);

    let port = cli.port.unwrap_or(config.port);
    let socket = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let (_addr, handle) = mockchain_rpc::launch(socket, facade)
        .await
        .context("failed to start rpc server")?;

    handle.stopped().await;
    Ok(())
}
