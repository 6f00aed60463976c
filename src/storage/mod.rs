//! Storage layer for the ledger
//!
//! Services talk to the backing store through the repository traits below.
//! The JSON file repositories are the production implementation; tests swap
//! individual stores through [`Stores`] to inject failures.

pub mod accounts;
pub mod allocations;
pub mod collection;
pub mod envelopes;
pub mod file_io;
pub mod transactions;

pub use accounts::AccountRepository;
pub use allocations::AllocationRepository;
pub use collection::{JsonCollection, Record};
pub use envelopes::EnvelopeRepository;
pub use file_io::{read_json, write_json_atomic};
pub use transactions::TransactionRepository;

use crate::audit::AuditLogger;
use crate::config::paths::EnvelopePaths;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{
    Account, AccountId, AllocationId, Envelope, EnvelopeId, Money, Month, MonthlyAllocation,
    Transaction, TransactionId,
};

pub trait AccountStore {
    fn get(&self, id: AccountId) -> EnvelopeResult<Option<Account>>;

    /// All accounts, sorted by name
    fn list(&self) -> EnvelopeResult<Vec<Account>>;

    fn upsert(&self, account: Account) -> EnvelopeResult<()>;

    /// Add signed deltas to the balance and the ready-to-assign pool
    fn apply_delta(
        &self,
        id: AccountId,
        balance: Money,
        ready_to_assign: Money,
    ) -> EnvelopeResult<Account>;
}

pub trait EnvelopeStore {
    fn get(&self, id: EnvelopeId) -> EnvelopeResult<Option<Envelope>>;

    /// All envelopes, sorted by group then name
    fn list(&self) -> EnvelopeResult<Vec<Envelope>>;

    fn upsert(&self, envelope: Envelope) -> EnvelopeResult<()>;
}

pub trait AllocationStore {
    fn get(&self, id: AllocationId) -> EnvelopeResult<Option<MonthlyAllocation>>;

    /// Allocations of one envelope in one month, oldest first
    fn for_envelope_month(
        &self,
        envelope_id: EnvelopeId,
        month: Month,
    ) -> EnvelopeResult<Vec<MonthlyAllocation>>;

    /// All allocations of a month, oldest first
    fn for_month(&self, month: Month) -> EnvelopeResult<Vec<MonthlyAllocation>>;

    fn insert(&self, allocation: MonthlyAllocation) -> EnvelopeResult<()>;

    /// Add a signed delta to `spent`, keeping `remaining = allocated - spent`
    fn adjust_spent(&self, id: AllocationId, delta: Money) -> EnvelopeResult<MonthlyAllocation>;

    fn remove(&self, id: AllocationId) -> EnvelopeResult<bool>;

    /// The most recently created allocation for the envelope and month
    fn latest_for(
        &self,
        envelope_id: EnvelopeId,
        month: Month,
    ) -> EnvelopeResult<Option<MonthlyAllocation>> {
        Ok(self.for_envelope_month(envelope_id, month)?.pop())
    }
}

pub trait TransactionStore {
    fn get(&self, id: TransactionId) -> EnvelopeResult<Option<Transaction>>;

    /// All transactions, newest first
    fn list(&self) -> EnvelopeResult<Vec<Transaction>>;

    fn by_account(&self, account_id: AccountId) -> EnvelopeResult<Vec<Transaction>>;

    /// Insert or replace by id
    fn insert(&self, transaction: Transaction) -> EnvelopeResult<()>;

    fn remove(&self, id: TransactionId) -> EnvelopeResult<bool>;

    /// The other half of a transfer, if any
    fn linked(&self, id: TransactionId) -> EnvelopeResult<Option<Transaction>> {
        match self.get(id)?.and_then(|t| t.transfer_transaction_id) {
            Some(linked_id) => self.get(linked_id),
            None => Ok(None),
        }
    }
}

/// Borrowed view of every store a service needs
#[derive(Clone, Copy)]
pub struct Stores<'a> {
    pub accounts: &'a dyn AccountStore,
    pub envelopes: &'a dyn EnvelopeStore,
    pub allocations: &'a dyn AllocationStore,
    pub transactions: &'a dyn TransactionStore,
    pub audit: &'a AuditLogger,
}

/// Owns the JSON repositories and the audit logger
pub struct Storage {
    paths: EnvelopePaths,
    pub accounts: AccountRepository,
    pub envelopes: EnvelopeRepository,
    pub allocations: AllocationRepository,
    pub transactions: TransactionRepository,
    audit: AuditLogger,
}

impl Storage {
    pub fn new(paths: EnvelopePaths) -> Result<Self, EnvelopeError> {
        paths.ensure_directories()?;

        Ok(Self {
            accounts: AccountRepository::new(paths.accounts_file()),
            envelopes: EnvelopeRepository::new(paths.envelopes_file()),
            allocations: AllocationRepository::new(paths.allocations_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &EnvelopePaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), EnvelopeError> {
        self.accounts.load()?;
        self.envelopes.load()?;
        self.allocations.load()?;
        self.transactions.load()?;
        Ok(())
    }

    pub fn stores(&self) -> Stores<'_> {
        Stores {
            accounts: &self.accounts,
            envelopes: &self.envelopes,
            allocations: &self.allocations,
            transactions: &self.transactions,
            audit: &self.audit,
        }
    }

    /// Whether `init` has been run
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
