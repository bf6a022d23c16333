mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use std::{path::PathBuf, sync::Arc};

use crate::{
    app::App,
    consolidation::ConsolidationResult,
    events::TracingEventSink,
    node::{BitcoindClient, NodeClient},
    primitives::*,
};
pub use config::*;

#[derive(Parser)]
#[clap(version, long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[clap(short, long, global = true, env = "FAUCET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
    #[clap(long, global = true, env = "FAUCET_BITCOIN_RPC_USER", hide_env_values = true)]
    rpc_user: Option<String>,
    #[clap(
        long,
        global = true,
        env = "FAUCET_BITCOIN_RPC_PASSWORD",
        hide_env_values = true
    )]
    rpc_password: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs the payout, balance and consolidation jobs until interrupted
    Run {
        #[clap(env = "CRASH_REPORT_CONFIG")]
        crash_report_config: Option<bool>,
    },
    #[clap(flatten)]
    Operator(OperatorCommand),
}

#[derive(Subcommand)]
enum OperatorCommand {
    /// Queues a payout request
    Submit {
        address: String,
        /// Identifier the rate limit is applied to
        #[clap(short, long, default_value = "127.0.0.1")]
        source: String,
        #[clap(short, long)]
        tier: Option<u32>,
    },
    /// Merges small wallet outputs into one
    Consolidate,
    /// Shows the wallet balances
    Balance,
    /// Shows payout counts and the most recent requests
    Stats,
    /// Lists the wallet's unspent outputs
    Utxos,
    /// Generates a fresh deposit address
    NewAddress,
    /// Sends funds from the wallet without queueing a payout request
    Send {
        address: String,
        /// Amount in BTC
        amount: Decimal,
        #[clap(short, long)]
        memo: Option<String>,
    },
    /// Checks that the node and the store are reachable
    Health,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_path(
        cli.config,
        EnvOverride {
            rpc_user: cli.rpc_user,
            rpc_password: cli.rpc_password,
        },
    )?;

    match cli.command {
        Command::Run {
            crash_report_config,
        } => match (run_cmd(config.clone()).await, crash_report_config) {
            (Err(e), Some(true)) => {
                println!("Faucet was started with the following config:");
                println!("{}", serde_yaml::to_string(&config)?);
                return Err(e);
            }
            (Err(e), _) => return Err(e),
            _ => (),
        },
        Command::Operator(command) => {
            let app = init_app(&config).await?;
            run_operator_cmd(&app, command).await?;
        }
    }
    Ok(())
}

async fn init_app(config: &Config) -> anyhow::Result<App> {
    let pool = crate::db::init_pool(&config.db)
        .await
        .context("Couldn't open the database")?;
    let node: Arc<dyn NodeClient> = Arc::new(BitcoindClient::connect(&config.node)?);
    let app = App::init(
        pool,
        node,
        &config.node.wallet_name,
        config.app.clone(),
        Arc::new(TracingEventSink),
    )
    .await?;
    Ok(app)
}

async fn run_cmd(config: Config) -> anyhow::Result<()> {
    crate::tracing::init_tracer(config.tracing.clone())?;
    println!("Starting faucet jobs");
    let app = init_app(&config).await?;
    println!(
        "Wallet [{}] loaded, cached balance {} BTC",
        config.node.wallet_name,
        app.current_cached_balance().await.format_btc()
    );
    let jobs = app.start_jobs().await?;

    tokio::signal::ctrl_c()
        .await
        .context("Couldn't listen for shutdown signal")?;
    println!("Shutdown signal received, finishing current work...");
    jobs.shutdown(app.shutdown_timeout()).await?;
    println!("Faucet stopped");
    Ok(())
}

async fn run_operator_cmd(app: &App, command: OperatorCommand) -> anyhow::Result<()> {
    match command {
        OperatorCommand::Submit {
            address,
            source,
            tier,
        } => {
            let request = app.submit(&address, &source, tier).await?;
            println!(
                "Address queued - {} ({} BTC to {})",
                request.id,
                request.amount.format_btc(),
                request.address
            );
        }
        OperatorCommand::Consolidate => match app.consolidate().await? {
            ConsolidationResult::Consolidated {
                tx_id,
                count,
                total_amount,
                output_amount,
                address,
                ..
            } => println!(
                "Consolidated {count} UTXOs ({} BTC) into {} BTC at {address} - {tx_id}",
                total_amount.format_btc(),
                output_amount.format_btc()
            ),
            ConsolidationResult::Skipped(reason) => println!("{reason}"),
        },
        OperatorCommand::Balance => {
            let balances = app.wallet_balances().await?;
            println!("trusted:   {}", balances.trusted.format_btc());
            println!("pending:   {}", balances.untrusted_pending.format_btc());
            println!("immature:  {}", balances.immature.format_btc());
            println!("total:     {}", balances.total().format_btc());
        }
        OperatorCommand::Stats => {
            let stats = app.stats().await?;
            println!("pending:    {}", stats.pending);
            println!("processing: {}", stats.processing);
            println!("broadcast:  {}", stats.broadcast);
            println!("failed:     {}", stats.failed);
            println!("total sent: {} BTC", stats.total_sent.format_btc());
            for request in stats.recent {
                println!(
                    "{} {} {:<10} {} {}",
                    request.created_at.to_rfc3339(),
                    request.id,
                    request.status.as_str(),
                    request.amount.format_btc(),
                    request.address
                );
            }
        }
        OperatorCommand::Utxos => {
            for utxo in app.list_unspent().await? {
                println!(
                    "{}:{} {} confirmations={} spendable={}",
                    utxo.txid,
                    utxo.vout,
                    utxo.amount.format_btc(),
                    utxo.confirmations,
                    utxo.spendable
                );
            }
        }
        OperatorCommand::NewAddress => {
            println!("New Address - {}", app.new_deposit_address().await?);
        }
        OperatorCommand::Send {
            address,
            amount,
            memo,
        } => {
            let tx_id = app
                .send_funds(&address, Satoshis::from_btc(amount), memo)
                .await?;
            println!("Sent {amount} BTC to {address} - {tx_id}");
        }
        OperatorCommand::Health => {
            let report = app.health().await;
            if let Some(chain) = &report.chain {
                println!("chain: {} blocks: {}", chain.chain, chain.blocks);
            }
            if !report.is_healthy() {
                anyhow::bail!(
                    "unhealthy (node: {}, store: {})",
                    report.node_error.as_deref().unwrap_or("ok"),
                    report.store_error.as_deref().unwrap_or("ok")
                );
            }
            println!("ok");
        }
    }
    Ok(())
}
