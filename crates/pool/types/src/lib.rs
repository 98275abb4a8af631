//! Pool Types - shared vocabulary for the shared-balance ledger
//!
//! A *wallet* is a pooled balance co-owned by several *participants*. These
//! types are shared between the ledger core and its operator tooling:
//!
//! - **AccountId**: identifier of any account (wallet, participant or counterparty)
//! - **WalletStatus / ParticipantStatus**: lifecycle states
//! - **LedgerEvent**: notifications emitted for every committed change
//! - **RelationshipQuery / RelationshipOverview**: read-side reporting

#![deny(unsafe_code)]

pub mod events;
pub mod ids;
pub mod overview;
pub mod status;

pub use events::{BalanceChange, BalanceDelta, LedgerEvent};
pub use ids::AccountId;
pub use overview::{RelationshipOverview, RelationshipPair, RelationshipQuery};
pub use status::{ParticipantStatus, TransferKind, WalletStatus};
