//! Read-only queries

use clap::Subcommand;
use pool_types::{AccountId, RelationshipOverview, RelationshipQuery};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::error::{CliError, CliResult};
use crate::output::{print_output, print_single, OutputFormat};

/// Query subcommands
#[derive(Subcommand)]
pub enum QueryCommands {
    /// List a wallet's participants in index order
    Participants {
        /// Wallet address
        wallet: String,
    },

    /// List the wallets a participant belongs to
    Wallets {
        /// Participant address
        participant: String,
    },

    /// Show a wallet balance, or one participant's share of it
    Balance {
        /// Wallet address
        wallet: String,

        /// Participant address
        participant: Option<String>,
    },

    /// Show wallet count and combined balance
    Totals,
}

#[derive(Debug, Serialize, Tabled)]
struct ParticipantRow {
    #[tabled(rename = "INDEX")]
    index: u16,
    #[tabled(rename = "PARTICIPANT")]
    participant: String,
    #[tabled(rename = "BALANCE")]
    balance: u64,
}

#[derive(Debug, Serialize, Tabled)]
struct WalletRow {
    #[tabled(rename = "WALLET")]
    wallet: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "BALANCE")]
    balance: u64,
    #[tabled(rename = "SHARE")]
    share: u64,
}

#[derive(Debug, Serialize, Tabled)]
struct BalanceRow {
    #[tabled(rename = "WALLET")]
    wallet: String,
    #[tabled(rename = "PARTICIPANT")]
    participant: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "BALANCE")]
    balance: u64,
}

#[derive(Debug, Serialize, Tabled)]
struct TotalsRow {
    #[tabled(rename = "WALLETS")]
    wallet_count: u32,
    #[tabled(rename = "COMBINED BALANCE")]
    combined_balance: u64,
}

#[derive(Debug, Serialize, Tabled)]
struct OverviewRow {
    #[tabled(rename = "WALLET")]
    wallet: String,
    #[tabled(rename = "STATUS")]
    wallet_status: String,
    #[tabled(rename = "WALLET BALANCE")]
    wallet_balance: u64,
    #[tabled(rename = "PARTICIPANTS")]
    participant_count: usize,
    #[tabled(rename = "PARTICIPANT")]
    participant: String,
    #[tabled(rename = "REGISTERED")]
    participant_status: String,
    #[tabled(rename = "INDEX")]
    participant_index: String,
    #[tabled(rename = "SHARE")]
    participant_balance: u64,
}

impl From<RelationshipOverview> for OverviewRow {
    fn from(row: RelationshipOverview) -> Self {
        Self {
            wallet: row.wallet.to_string(),
            wallet_status: row.wallet_status.to_string(),
            wallet_balance: row.wallet_balance,
            participant_count: row.participant_count,
            participant: row.participant.to_string(),
            participant_status: row.participant_status.to_string(),
            participant_index: row
                .participant_index
                .map(|i| i.to_string())
                .unwrap_or_else(|| "-".to_string()),
            participant_balance: row.participant_balance,
        }
    }
}

/// Execute a query command
pub fn execute(command: QueryCommands, ctx: &Context) -> CliResult<()> {
    let ledger = ctx.store.open()?;

    match command {
        QueryCommands::Participants { wallet } => {
            let wallet = AccountId::new(wallet);
            let rows: Vec<ParticipantRow> = ledger
                .participants_of(&wallet)
                .into_iter()
                .enumerate()
                .map(|(index, participant)| ParticipantRow {
                    index: index as u16,
                    balance: ledger.participant_balance(&wallet, &participant),
                    participant: participant.to_string(),
                })
                .collect();
            print_output(rows, ctx.output)
        }

        QueryCommands::Wallets { participant } => {
            let participant = AccountId::new(participant);
            let rows: Vec<WalletRow> = ledger
                .wallets_of(&participant)
                .into_iter()
                .map(|wallet| WalletRow {
                    status: ledger.wallet_status(&wallet).to_string(),
                    balance: ledger.wallet_balance(&wallet),
                    share: ledger.participant_balance(&wallet, &participant),
                    wallet: wallet.to_string(),
                })
                .collect();
            print_output(rows, ctx.output)
        }

        QueryCommands::Balance {
            wallet,
            participant,
        } => {
            let wallet = AccountId::new(wallet);
            let row = match participant {
                Some(participant) => {
                    let participant = AccountId::new(participant);
                    BalanceRow {
                        wallet: wallet.to_string(),
                        status: ledger.wallet_status(&wallet).to_string(),
                        balance: ledger.participant_balance(&wallet, &participant),
                        participant: participant.to_string(),
                    }
                }
                None => BalanceRow {
                    wallet: wallet.to_string(),
                    participant: "*".to_string(),
                    status: ledger.wallet_status(&wallet).to_string(),
                    balance: ledger.wallet_balance(&wallet),
                },
            };
            print_output(vec![row], ctx.output)
        }

        QueryCommands::Totals => print_output(
            vec![TotalsRow {
                wallet_count: ledger.wallet_count(),
                combined_balance: ledger.combined_balance(),
            }],
            ctx.output,
        ),
    }
}

/// Parse `wallet:participant`, where `*` or an empty side is a wildcard.
pub fn parse_pair(raw: &str) -> CliResult<RelationshipQuery> {
    let (wallet, participant) = raw
        .split_once(':')
        .ok_or_else(|| CliError::InvalidInput(format!("expected wallet:participant, got '{raw}'")))?;

    let side = |value: &str| {
        let value = value.trim();
        if value.is_empty() || value == "*" {
            None
        } else {
            Some(AccountId::new(value))
        }
    };
    Ok(RelationshipQuery::new(side(wallet), side(participant)))
}

/// Report relationship overviews for the given pairs.
pub fn overview(pairs: &[String], ctx: &Context) -> CliResult<()> {
    let queries = pairs
        .iter()
        .map(|raw| parse_pair(raw))
        .collect::<CliResult<Vec<_>>>()?;
    let ledger = ctx.store.open()?;
    let rows = ledger.relationship_overviews(&queries)?;
    match ctx.output {
        OutputFormat::Json => print_single(&rows),
        OutputFormat::Table => print_output(rows.into_iter().map(OverviewRow::from).collect(), ctx.output),
    }
}
