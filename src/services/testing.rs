//! Test helpers: temp storage and stores that fail on demand

use std::cell::Cell;

use tempfile::TempDir;

use crate::config::paths::EnvelopePaths;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{
    Account, AccountId, AllocationId, EnvelopeId, Money, Month, MonthlyAllocation, Transaction,
    TransactionId,
};
use crate::storage::{AccountStore, AllocationStore, Storage, Stores, TransactionStore};

pub fn create_test_storage() -> (TempDir, Storage) {
    let temp_dir = TempDir::new().unwrap();
    let paths = EnvelopePaths::with_base_dir(temp_dir.path().to_path_buf());
    let storage = Storage::new(paths).unwrap();
    storage.load_all().unwrap();
    (temp_dir, storage)
}

fn injected(what: &str) -> EnvelopeError {
    EnvelopeError::Storage(format!("injected {} failure", what))
}

/// Account store whose `apply_delta` fails while `fail_apply` is set, or for
/// the one account in `fail_apply_for`
pub struct FailingAccounts<'a> {
    pub inner: &'a dyn AccountStore,
    pub fail_apply: Cell<bool>,
    pub fail_apply_for: Cell<Option<AccountId>>,
}

impl<'a> FailingAccounts<'a> {
    pub fn new(inner: &'a dyn AccountStore) -> Self {
        Self {
            inner,
            fail_apply: Cell::new(true),
            fail_apply_for: Cell::new(None),
        }
    }

    /// Fail only deltas that target `id`
    pub fn only_for(inner: &'a dyn AccountStore, id: AccountId) -> Self {
        Self {
            inner,
            fail_apply: Cell::new(false),
            fail_apply_for: Cell::new(Some(id)),
        }
    }
}

impl AccountStore for FailingAccounts<'_> {
    fn get(&self, id: AccountId) -> EnvelopeResult<Option<Account>> {
        self.inner.get(id)
    }

    fn list(&self) -> EnvelopeResult<Vec<Account>> {
        self.inner.list()
    }

    fn upsert(&self, account: Account) -> EnvelopeResult<()> {
        self.inner.upsert(account)
    }

    fn apply_delta(
        &self,
        id: AccountId,
        balance: Money,
        ready_to_assign: Money,
    ) -> EnvelopeResult<Account> {
        if self.fail_apply.get() || self.fail_apply_for.get() == Some(id) {
            return Err(injected("account"));
        }
        self.inner.apply_delta(id, balance, ready_to_assign)
    }
}

/// Allocation store that fails `adjust_spent` for one allocation, or
/// `insert` while `fail_insert` is set
pub struct FailingAllocations<'a> {
    pub inner: &'a dyn AllocationStore,
    pub fail_adjust_for: Cell<Option<AllocationId>>,
    pub fail_adjust_all: Cell<bool>,
    pub fail_insert: Cell<bool>,
}

impl<'a> FailingAllocations<'a> {
    pub fn new(inner: &'a dyn AllocationStore) -> Self {
        Self {
            inner,
            fail_adjust_for: Cell::new(None),
            fail_adjust_all: Cell::new(false),
            fail_insert: Cell::new(false),
        }
    }
}

impl AllocationStore for FailingAllocations<'_> {
    fn get(&self, id: AllocationId) -> EnvelopeResult<Option<MonthlyAllocation>> {
        self.inner.get(id)
    }

    fn for_envelope_month(
        &self,
        envelope_id: EnvelopeId,
        month: Month,
    ) -> EnvelopeResult<Vec<MonthlyAllocation>> {
        self.inner.for_envelope_month(envelope_id, month)
    }

    fn for_month(&self, month: Month) -> EnvelopeResult<Vec<MonthlyAllocation>> {
        self.inner.for_month(month)
    }

    fn insert(&self, allocation: MonthlyAllocation) -> EnvelopeResult<()> {
        if self.fail_insert.get() {
            return Err(injected("allocation insert"));
        }
        self.inner.insert(allocation)
    }

    fn adjust_spent(&self, id: AllocationId, delta: Money) -> EnvelopeResult<MonthlyAllocation> {
        if self.fail_adjust_all.get() || self.fail_adjust_for.get() == Some(id) {
            return Err(injected("allocation"));
        }
        self.inner.adjust_spent(id, delta)
    }

    fn remove(&self, id: AllocationId) -> EnvelopeResult<bool> {
        self.inner.remove(id)
    }
}

/// Transaction store whose `insert` fails for transactions of one account
pub struct FailingTransactions<'a> {
    pub inner: &'a dyn TransactionStore,
    pub fail_insert_for: Cell<Option<AccountId>>,
}

impl<'a> FailingTransactions<'a> {
    pub fn new(inner: &'a dyn TransactionStore) -> Self {
        Self {
            inner,
            fail_insert_for: Cell::new(None),
        }
    }
}

impl TransactionStore for FailingTransactions<'_> {
    fn get(&self, id: TransactionId) -> EnvelopeResult<Option<Transaction>> {
        self.inner.get(id)
    }

    fn list(&self) -> EnvelopeResult<Vec<Transaction>> {
        self.inner.list()
    }

    fn by_account(&self, account_id: AccountId) -> EnvelopeResult<Vec<Transaction>> {
        self.inner.by_account(account_id)
    }

    fn insert(&self, transaction: Transaction) -> EnvelopeResult<()> {
        if self.fail_insert_for.get() == Some(transaction.account_id) {
            return Err(injected("transaction insert"));
        }
        self.inner.insert(transaction)
    }

    fn remove(&self, id: TransactionId) -> EnvelopeResult<bool> {
        self.inner.remove(id)
    }
}

/// `storage.stores()` with the account store swapped out
pub fn with_accounts<'a>(storage: &'a Storage, accounts: &'a dyn AccountStore) -> Stores<'a> {
    Stores {
        accounts,
        ..storage.stores()
    }
}

/// `storage.stores()` with the allocation store swapped out
pub fn with_allocations<'a>(
    storage: &'a Storage,
    allocations: &'a dyn AllocationStore,
) -> Stores<'a> {
    Stores {
        allocations,
        ..storage.stores()
    }
}
