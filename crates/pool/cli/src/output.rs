//! Output formatting utilities

use colored::*;
use pool_ledger::EventEnvelope;
use pool_types::LedgerEvent;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a vector of items in the specified format
pub fn print_output<T: Serialize + Tabled>(data: Vec<T>, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", "No results".dimmed());
            } else {
                println!("{}", Table::new(data));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }
    Ok(())
}

/// Print a single item as JSON regardless of format
pub fn print_single<T: Serialize>(data: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// One notification as a table row.
#[derive(Debug, Serialize, Tabled)]
pub struct EventRow {
    #[tabled(rename = "SEQ")]
    pub sequence: String,
    #[tabled(rename = "EVENT")]
    pub event: String,
    #[tabled(rename = "WALLET")]
    pub wallet: String,
    #[tabled(rename = "DETAIL")]
    pub detail: String,
}

impl EventRow {
    pub fn from_event(sequence: Option<u64>, event: &LedgerEvent) -> Self {
        Self {
            sequence: sequence.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            event: event.name().to_string(),
            wallet: event.wallet().to_string(),
            detail: describe(event),
        }
    }

    pub fn from_envelope(envelope: &EventEnvelope) -> Self {
        Self::from_event(Some(envelope.sequence), &envelope.event)
    }
}

fn describe(event: &LedgerEvent) -> String {
    match event {
        LedgerEvent::WalletCreated { participants, .. } => {
            let names: Vec<&str> = participants.iter().map(|p| p.as_str()).collect();
            format!("participants [{}]", names.join(", "))
        }
        LedgerEvent::WalletSuspended { .. }
        | LedgerEvent::WalletResumed { .. }
        | LedgerEvent::WalletDeleted { .. } => String::new(),
        LedgerEvent::ParticipantAdded {
            participant, index, ..
        } => format!("{participant} at index {index}"),
        LedgerEvent::ParticipantRemoved { participant, .. } => participant.to_string(),
        LedgerEvent::Deposit(change)
        | LedgerEvent::Withdrawal(change)
        | LedgerEvent::TransferIn(change)
        | LedgerEvent::TransferOut(change) => format!(
            "{} {} ({} -> {}), wallet {} -> {}",
            change.participant,
            change.amount,
            change.participant_balance.old,
            change.participant_balance.new,
            change.wallet_balance.old,
            change.wallet_balance.new
        ),
    }
}

/// Print the notifications a command produced.
pub fn print_events(events: &[LedgerEvent], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_single(&events),
        OutputFormat::Table => print_output(
            events.iter().map(|e| EventRow::from_event(None, e)).collect(),
            format,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_types::AccountId;

    #[test]
    fn test_output_format_default() {
        let format = OutputFormat::default();
        assert!(matches!(format, OutputFormat::Table));
    }

    #[test]
    fn test_event_row_detail() {
        let row = EventRow::from_event(
            Some(3),
            &LedgerEvent::ParticipantAdded {
                wallet: AccountId::new("w"),
                participant: AccountId::new("p1"),
                index: 1,
            },
        );
        assert_eq!(row.sequence, "3");
        assert_eq!(row.event, "ParticipantAdded");
        assert_eq!(row.detail, "p1 at index 1");
    }
}
