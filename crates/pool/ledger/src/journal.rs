//! Append-only notification journal with hash-chain proofs.
//!
//! Every committed operation appends its notifications here in emission
//! order. Nothing is ever rewritten; a failed operation appends nothing.

use chrono::{DateTime, Utc};
use pool_types::LedgerEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;

/// One journaled notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub event_id: String,
    /// Entry point that produced the notification, e.g. `create_wallet`.
    pub operation: String,
    pub timestamp: DateTime<Utc>,
    pub event: LedgerEvent,
    pub previous_hash: Option<String>,
    pub entry_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventJournal {
    entries: Vec<EventEnvelope>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a journal from persisted entries and verify the chain.
    pub fn from_entries(entries: Vec<EventEnvelope>) -> Result<Self, LedgerError> {
        for (expected, entry) in entries.iter().enumerate() {
            if entry.sequence != expected as u64 {
                return Err(LedgerError::Journal(format!(
                    "sequence gap at position {} (found {})",
                    expected, entry.sequence
                )));
            }
        }

        let journal = Self { entries };
        journal.verify_chain()?;
        Ok(journal)
    }

    pub fn entries(&self) -> &[EventEnvelope] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_hash(&self) -> Option<&str> {
        self.entries.last().map(|entry| entry.entry_hash.as_str())
    }

    /// Append one operation's notifications as a unit.
    pub fn append_all(
        &mut self,
        operation: &str,
        events: Vec<LedgerEvent>,
    ) -> Result<Vec<EventEnvelope>, LedgerError> {
        let entries = self.build_entries(operation, events)?;
        for entry in &entries {
            self.commit_entry(entry.clone())?;
        }
        Ok(entries)
    }

    /// Build the next entries without mutating the chain.
    pub fn build_entries(
        &self,
        operation: &str,
        events: Vec<LedgerEvent>,
    ) -> Result<Vec<EventEnvelope>, LedgerError> {
        let mut sequence = self.entries.len() as u64;
        let mut previous_hash = self.last_hash().map(str::to_string);
        let timestamp = Utc::now();

        let mut built = Vec::with_capacity(events.len());
        for event in events {
            let entry_hash = compute_entry_hash(
                sequence,
                operation,
                timestamp,
                &event,
                previous_hash.as_deref(),
            )?;
            built.push(EventEnvelope {
                sequence,
                event_id: Uuid::new_v4().to_string(),
                operation: operation.to_string(),
                timestamp,
                event,
                previous_hash: previous_hash.take(),
                entry_hash: entry_hash.clone(),
            });
            previous_hash = Some(entry_hash);
            sequence += 1;
        }
        Ok(built)
    }

    /// Commit a pre-built entry.
    pub fn commit_entry(&mut self, entry: EventEnvelope) -> Result<(), LedgerError> {
        let expected_sequence = self.entries.len() as u64;
        if entry.sequence != expected_sequence {
            return Err(LedgerError::Journal(format!(
                "commit sequence mismatch: expected {}, got {}",
                expected_sequence, entry.sequence
            )));
        }
        if entry.previous_hash.as_deref() != self.last_hash() {
            return Err(LedgerError::Journal(
                "commit previous hash mismatch".to_string(),
            ));
        }

        let expected_hash = compute_entry_hash(
            entry.sequence,
            &entry.operation,
            entry.timestamp,
            &entry.event,
            entry.previous_hash.as_deref(),
        )?;
        if entry.entry_hash != expected_hash {
            return Err(LedgerError::Journal(format!(
                "hash mismatch for entry {}",
                entry.sequence
            )));
        }

        self.entries.push(entry);
        Ok(())
    }

    /// Recompute every hash and link. Reports the first broken entry.
    pub fn verify_chain(&self) -> Result<(), LedgerError> {
        let mut previous_hash: Option<&str> = None;
        for entry in &self.entries {
            if entry.previous_hash.as_deref() != previous_hash {
                return Err(LedgerError::Journal(format!(
                    "entry {} does not link to its predecessor",
                    entry.sequence
                )));
            }
            let expected = compute_entry_hash(
                entry.sequence,
                &entry.operation,
                entry.timestamp,
                &entry.event,
                previous_hash,
            )?;
            if entry.entry_hash != expected {
                return Err(LedgerError::Journal(format!(
                    "entry {} hash mismatch",
                    entry.sequence
                )));
            }
            previous_hash = Some(entry.entry_hash.as_str());
        }
        Ok(())
    }
}

fn compute_entry_hash(
    sequence: u64,
    operation: &str,
    timestamp: DateTime<Utc>,
    event: &LedgerEvent,
    previous_hash: Option<&str>,
) -> Result<String, LedgerError> {
    let material = serde_json::json!({
        "sequence": sequence,
        "operation": operation,
        "timestamp": timestamp,
        "event": event,
        "previous_hash": previous_hash,
    });

    let bytes = serde_json::to_vec(&material).map_err(|e| LedgerError::Journal(e.to_string()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pool_types::AccountId;

    fn created(wallet: &str) -> LedgerEvent {
        LedgerEvent::WalletCreated {
            wallet: AccountId::new(wallet),
            participants: vec![AccountId::new("p0")],
        }
    }

    #[test]
    fn appends_link_into_a_chain() {
        let mut journal = EventJournal::new();
        journal
            .append_all("create_wallet", vec![created("w1"), created("w2")])
            .unwrap();
        journal
            .append_all(
                "suspend_wallet",
                vec![LedgerEvent::WalletSuspended {
                    wallet: AccountId::new("w1"),
                }],
            )
            .unwrap();

        assert_eq!(journal.len(), 3);
        assert_eq!(journal.entries()[0].previous_hash, None);
        assert_eq!(
            journal.entries()[2].previous_hash.as_deref(),
            Some(journal.entries()[1].entry_hash.as_str())
        );
        journal.verify_chain().unwrap();
    }

    #[test]
    fn detects_tampered_entries() {
        let mut journal = EventJournal::new();
        journal.append_all("create_wallet", vec![created("w1")]).unwrap();

        let mut tampered = journal.clone();
        tampered.entries[0].event = created("w-evil");
        assert!(matches!(tampered.verify_chain(), Err(LedgerError::Journal(_))));
    }

    #[test]
    fn from_entries_rejects_gaps() {
        let mut journal = EventJournal::new();
        journal
            .append_all("create_wallet", vec![created("w1"), created("w2")])
            .unwrap();

        let mut entries = journal.entries().to_vec();
        entries.remove(0);
        assert!(EventJournal::from_entries(entries).is_err());

        let restored = EventJournal::from_entries(journal.entries().to_vec()).unwrap();
        assert_eq!(restored, journal);
    }

    #[test]
    fn stale_entry_cannot_be_committed() {
        let mut journal = EventJournal::new();
        let stale = journal.build_entries("create_wallet", vec![created("w1")]).unwrap();
        journal.append_all("create_wallet", vec![created("w2")]).unwrap();

        assert!(journal.commit_entry(stale[0].clone()).is_err());
    }
}
