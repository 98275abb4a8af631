//! Journal inspection and replay

use pool_types::AccountId;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::error::CliResult;
use crate::output::{print_output, print_single, EventRow, OutputFormat};

/// List journaled notifications, optionally verifying the hash chain first.
pub fn list(verify: bool, wallet: Option<String>, limit: Option<usize>, ctx: &Context) -> CliResult<()> {
    let ledger = ctx.store.open()?;
    if verify {
        ledger.journal().verify_chain()?;
        ctx.success(&format!(
            "Hash chain verified ({} entries)",
            ledger.journal().len()
        ));
    }

    let wallet = wallet.map(AccountId::new);
    let mut entries: Vec<_> = ledger
        .events()
        .iter()
        .filter(|entry| wallet.as_ref().map_or(true, |w| entry.event.wallet() == w))
        .collect();
    if let Some(limit) = limit {
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
    }

    match ctx.output {
        OutputFormat::Json => print_single(&entries),
        OutputFormat::Table => print_output(
            entries.into_iter().map(EventRow::from_envelope).collect(),
            ctx.output,
        ),
    }
}

#[derive(Debug, Serialize, Tabled)]
struct ReplayRow {
    #[tabled(rename = "WALLET")]
    wallet: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "BALANCE")]
    balance: u64,
    #[tabled(rename = "PARTICIPANTS")]
    participants: usize,
}

/// Rebuild balances from the journal and check them against stored state.
pub fn replay(ctx: &Context) -> CliResult<()> {
    let ledger = ctx.store.open()?;
    let history = ledger.verify_history()?;
    ctx.success(&format!(
        "Replayed {} notifications, state matches journal",
        history.applied()
    ));

    match ctx.output {
        OutputFormat::Json => print_single(&history),
        OutputFormat::Table => print_output(
            history
                .wallets()
                .iter()
                .map(|(wallet, replayed)| ReplayRow {
                    wallet: wallet.to_string(),
                    status: replayed.status.to_string(),
                    balance: replayed.balance,
                    participants: replayed.participants.len(),
                })
                .collect(),
            ctx.output,
        ),
    }
}
