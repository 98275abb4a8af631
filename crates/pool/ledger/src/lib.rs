//! Pool Ledger - shared-balance wallets with proportional participant shares.
//!
//! A wallet's pooled balance always equals the sum of its participants'
//! balances. Token movements reported through the transfer hook are booked
//! either directly against one participant (deposit / withdrawal) or spread
//! across all participants in proportion to their current balances
//! (transfer in / transfer out).
//!
//! Every committed change is journaled as a hash-chained notification so the
//! balances can be rebuilt and audited from the stream alone.

#![deny(unsafe_code)]

pub mod access;
pub mod aggregate;
pub mod allocation;
pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod journal;
pub mod ledger;
pub mod participant;
pub mod query;
pub mod snapshot;
pub mod wallet;

pub use access::{AccessPolicy, Action, RoleTable};
pub use aggregate::AggregateLedger;
pub use allocation::{Allocation, ShareAllocator};
pub use classifier::{Movement, TransferClassifier};
pub use config::LedgerConfig;
pub use error::{ErrorKind, LedgerError};
pub use history::{BalanceHistory, ReplayedWallet};
pub use journal::{EventEnvelope, EventJournal};
pub use ledger::{LedgerState, SharedWalletLedger};
pub use participant::{ParticipantRegistry, ParticipantState, Roster};
pub use query::PairNormalizer;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
pub use wallet::{WalletRecord, WalletRegistry};

pub use pool_types::{
    AccountId, BalanceChange, BalanceDelta, LedgerEvent, ParticipantStatus, RelationshipOverview,
    RelationshipPair, RelationshipQuery, TransferKind, WalletStatus,
};
