//! Wallet lifecycle commands

use clap::Subcommand;
use pool_types::AccountId;

use super::{parse_accounts, Context};
use crate::error::CliResult;
use crate::output::print_events;

/// Wallet subcommands
#[derive(Subcommand)]
pub enum WalletCommands {
    /// Create a wallet; the first participant becomes the initiator
    Create {
        /// Wallet address
        wallet: String,

        /// Initial participants, in index order
        #[arg(required = true, num_args = 1..)]
        participants: Vec<String>,
    },

    /// Suspend an active wallet with zero balance
    Suspend {
        /// Wallet address
        wallet: String,
    },

    /// Resume a suspended wallet
    Resume {
        /// Wallet address
        wallet: String,
    },

    /// Delete a suspended, drained wallet and all its participants
    Delete {
        /// Wallet address
        wallet: String,
    },
}

/// Execute a wallet command
pub fn execute(command: WalletCommands, ctx: &Context) -> CliResult<()> {
    let caller = ctx.admin_caller()?;
    let mut ledger = ctx.store.open()?;

    let (events, message) = match command {
        WalletCommands::Create {
            wallet,
            participants,
        } => {
            let wallet = AccountId::new(wallet);
            let participants = parse_accounts(&participants);
            let events = ledger.create_wallet(&caller, &wallet, &participants)?;
            (events, format!("Wallet {} created with {} participants", wallet, participants.len()))
        }
        WalletCommands::Suspend { wallet } => {
            let wallet = AccountId::new(wallet);
            (ledger.suspend_wallet(&caller, &wallet)?, format!("Wallet {wallet} suspended"))
        }
        WalletCommands::Resume { wallet } => {
            let wallet = AccountId::new(wallet);
            (ledger.resume_wallet(&caller, &wallet)?, format!("Wallet {wallet} resumed"))
        }
        WalletCommands::Delete { wallet } => {
            let wallet = AccountId::new(wallet);
            (ledger.delete_wallet(&caller, &wallet)?, format!("Wallet {wallet} deleted"))
        }
    };

    ctx.store.save(&ledger)?;
    ctx.success(&message);
    print_events(&events, ctx.output)
}
