//! Core data models for the envelope ledger
//!
//! This module contains the data structures of the budgeting domain:
//! accounts, envelopes, monthly allocations and transactions.

pub mod account;
pub mod allocation;
pub mod envelope;
pub mod ids;
pub mod money;
pub mod month;
pub mod transaction;

pub use account::{Account, AccountType};
pub use allocation::{AllocationTotals, MonthlyAllocation};
pub use envelope::{Cadence, Envelope, Objective};
pub use ids::{AccountId, AllocationId, EnvelopeId, TransactionId};
pub use money::{Money, MoneyOverflow};
pub use month::Month;
pub use transaction::{SplitItem, Transaction, TransactionKind};
