//! Membership commands

use clap::Subcommand;
use pool_types::AccountId;

use super::{parse_accounts, Context};
use crate::error::CliResult;
use crate::output::print_events;

/// Participant subcommands
#[derive(Subcommand)]
pub enum ParticipantCommands {
    /// Append participants to a wallet at zero balance
    Add {
        /// Wallet address
        wallet: String,

        /// Participants to add
        #[arg(required = true, num_args = 1..)]
        participants: Vec<String>,
    },

    /// Remove zero-balance participants (never the initiator)
    Remove {
        /// Wallet address
        wallet: String,

        /// Participants to remove
        #[arg(required = true, num_args = 1..)]
        participants: Vec<String>,
    },
}

/// Execute a participant command
pub fn execute(command: ParticipantCommands, ctx: &Context) -> CliResult<()> {
    let caller = ctx.admin_caller()?;
    let mut ledger = ctx.store.open()?;

    let (events, message) = match command {
        ParticipantCommands::Add {
            wallet,
            participants,
        } => {
            let wallet = AccountId::new(wallet);
            let events = ledger.add_participants(&caller, &wallet, &parse_accounts(&participants))?;
            (events, format!("Added {} participants to {}", participants.len(), wallet))
        }
        ParticipantCommands::Remove {
            wallet,
            participants,
        } => {
            let wallet = AccountId::new(wallet);
            let events = ledger.remove_participants(&caller, &wallet, &parse_accounts(&participants))?;
            (events, format!("Removed {} participants from {}", participants.len(), wallet))
        }
    };

    ctx.store.save(&ledger)?;
    ctx.success(&message);
    print_events(&events, ctx.output)
}
