// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use portal_bridge::client::EthClient;
use portal_bridge::types::BlockId;
use portal_bridge::{connect_nodes, Bridge, BridgeConfig, HeaderWatcher};

#[derive(Parser)]
#[command(name = "portal-bridge", about = "Push Ethereum history into the Portal network")]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow the chain head and propagate every new block
    Run,
    /// Propagate a single block, given by 0x hash or decimal number
    Push { block: BlockId },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = BridgeConfig::from_env()?;
    let eth = EthClient::new(cfg.eth_rpc_url.clone(), cfg.eth_rpc_bearer_token.as_deref());

    // Step 1: open every node session, or none
    let distributor = connect_nodes(&cfg.portal_nodes, cfg.targets.selector())
        .await
        .context("failed to connect to portal nodes")?;

    let cancel = CancellationToken::new();
    let bridge = Bridge::new(eth.clone(), distributor, cfg.chain_id)
        .with_forks(cfg.forks)
        .with_receipt_polling(cfg.receipt_poll, cfg.receipt_timeout)
        .with_cancellation(cancel.clone());

    // Step 2: stop cleanly on Ctrl-C
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down");
            cancel.cancel();
        }
    });

    // Step 3: run
    match cli.command {
        Command::Run => {
            let watcher = HeaderWatcher::new(eth, bridge, cfg.poll_interval);
            watcher.run().await;
        }
        Command::Push { block } => {
            let report = bridge.handle_block(block).await?;
            println!(
                "block #{} {:?}: header delivered to {}/{} node(s), receipts to {}/{}",
                report.block_number,
                report.block_hash,
                report.header.delivered(),
                report.header.attempted,
                report.receipts.delivered(),
                report.receipts.attempted,
            );
        }
    }

    Ok(())
}
