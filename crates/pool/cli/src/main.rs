//! poolctl - operator CLI for the shared-balance ledger
//!
//! Every command works against a snapshot file:
//! - Create, suspend, resume and delete wallets
//! - Add and remove participants
//! - Report token movements through the transfer hook
//! - Query balances, memberships and relationship overviews
//! - Inspect, verify and replay the notification journal

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;
mod store;

use commands::{events, participant, query, transfer, wallet, Context};
use config::CliConfig;
use error::CliResult;
use pool_types::AccountId;
use store::LedgerStore;

/// poolctl application
#[derive(Parser)]
#[command(name = "poolctl")]
#[command(about = "Shared-balance ledger operator CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "POOL_CONFIG", global = true)]
    config: Option<String>,

    /// Snapshot file (overrides `state_path` from configuration)
    #[arg(short, long, global = true)]
    state: Option<PathBuf>,

    /// Identity to act as (defaults to the first administrator, or the
    /// token ledger for `transfer`)
    #[arg(long, global = true)]
    caller: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    output: output::OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Manage wallets
    Wallet {
        #[command(subcommand)]
        command: wallet::WalletCommands,
    },

    /// Manage wallet participants
    Participant {
        #[command(subcommand)]
        command: participant::ParticipantCommands,
    },

    /// Report a token movement (runs both hook phases)
    Transfer {
        /// Sender
        from: String,
        /// Recipient
        to: String,
        /// Amount moved
        amount: u64,
    },

    /// Read-only queries
    Query {
        #[command(subcommand)]
        command: query::QueryCommands,
    },

    /// Relationship overviews for `wallet:participant` pairs (`*` is a wildcard)
    Overview {
        #[arg(required = true, num_args = 1..)]
        pairs: Vec<String>,
    },

    /// List journaled notifications
    Events {
        /// Verify the hash chain first
        #[arg(long)]
        verify: bool,

        /// Only notifications concerning this wallet
        #[arg(short, long)]
        wallet: Option<String>,

        /// Show only the most recent N entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Rebuild balances from the journal and compare with stored state
    Replay,

    /// Show effective configuration
    Config,
}

fn init_tracing(config: &CliConfig, verbose: bool, json: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());

    if json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn run(command: Commands, ctx: &Context, config: &CliConfig) -> CliResult<()> {
    match command {
        Commands::Wallet { command } => wallet::execute(command, ctx),
        Commands::Participant { command } => participant::execute(command, ctx),
        Commands::Transfer { from, to, amount } => transfer::execute(from, to, amount, ctx),
        Commands::Query { command } => query::execute(command, ctx),
        Commands::Overview { pairs } => query::overview(&pairs, ctx),
        Commands::Events {
            verify,
            wallet,
            limit,
        } => events::list(verify, wallet, limit, ctx),
        Commands::Replay => events::replay(ctx),
        Commands::Config => output::print_single(config),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&config, cli.verbose, cli.json_logs);

    if let Some(state) = cli.state {
        config.state_path = state;
    }
    config.ledger.validate().context("validating ledger configuration")?;

    let ctx = Context {
        store: LedgerStore::new(config.state_path.clone(), config.ledger.clone()),
        ledger_config: config.ledger.clone(),
        caller: cli.caller.map(AccountId::new),
        output: cli.output,
    };
    tracing::debug!(state = %ctx.store.path().display(), "poolctl starting");

    if let Err(err) = run(cli.command, &ctx, &config) {
        output::print_error(&err.to_string());
        std::process::exit(1);
    }
    Ok(())
}
