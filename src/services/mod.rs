//! Service layer
//!
//! Business logic on top of the storage traits: validation, two-leg ledger
//! postings with compensation, and cross-entity queries.

pub mod account;
pub mod budget;
pub mod envelope;
mod posting;
pub mod transaction;
pub mod transfer;

#[cfg(test)]
pub(crate) mod testing;

pub use account::{AccountService, BalanceCheck};
pub use budget::{BudgetService, EnvelopeSummary, MonthOverview};
pub use envelope::EnvelopeService;
pub use transaction::{
    RegisterTransactionInput, TransactionChanges, TransactionFilter, TransactionService,
};
pub use transfer::{TransferResult, TransferService};
