//! Account repository for JSON storage
//!
//! Manages loading and saving accounts to accounts.json

use std::path::PathBuf;

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{Account, AccountId, Money};

use super::collection::JsonCollection;
use super::AccountStore;

/// Repository for account persistence
pub struct AccountRepository {
    records: JsonCollection<Account>,
}

impl AccountRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            records: JsonCollection::new(path),
        }
    }

    /// Load accounts from disk
    pub fn load(&self) -> EnvelopeResult<()> {
        self.records.load()
    }
}

impl AccountStore for AccountRepository {
    fn get(&self, id: AccountId) -> EnvelopeResult<Option<Account>> {
        self.records.get(id)
    }

    fn list(&self) -> EnvelopeResult<Vec<Account>> {
        self.records.all()
    }

    fn upsert(&self, account: Account) -> EnvelopeResult<()> {
        self.records.upsert(account)
    }

    fn apply_delta(
        &self,
        id: AccountId,
        balance: Money,
        ready_to_assign: Money,
    ) -> EnvelopeResult<Account> {
        self.records
            .update(id, |account| Ok(account.apply_delta(balance, ready_to_assign)?))?
            .ok_or_else(|| EnvelopeError::account_not_found(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountType;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, AccountRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = AccountRepository::new(temp_dir.path().join("accounts.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_accounts_sorted_by_name() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Account::new("savings", AccountType::Checking)).unwrap();
        repo.upsert(Account::new("Checking", AccountType::Checking)).unwrap();
        repo.upsert(Account::new("Visa", AccountType::Credit)).unwrap();

        let names: Vec<String> = repo.list().unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["Checking", "savings", "Visa"]);
    }

    #[test]
    fn test_apply_delta() {
        let (_temp_dir, repo) = create_test_repo();
        let account = Account::new("Checking", AccountType::Checking);
        repo.upsert(account.clone()).unwrap();

        let updated = repo
            .apply_delta(account.id, Money::from_cents(-2500), Money::from_cents(1000))
            .unwrap();
        assert_eq!(updated.balance.cents(), -2500);
        assert_eq!(updated.ready_to_assign.cents(), 1000);
    }

    #[test]
    fn test_apply_delta_overflow_is_validation_error() {
        let (_temp_dir, repo) = create_test_repo();
        let account = Account::new("Checking", AccountType::Checking);
        repo.upsert(account.clone()).unwrap();
        repo.apply_delta(account.id, Money::from_cents(i64::MAX), Money::zero())
            .unwrap();

        let err = repo
            .apply_delta(account.id, Money::from_cents(1), Money::zero())
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(repo.get(account.id).unwrap().unwrap().balance.cents(), i64::MAX);
    }

    #[test]
    fn test_apply_delta_missing_account() {
        let (_temp_dir, repo) = create_test_repo();
        let err = repo
            .apply_delta(AccountId::new(), Money::from_cents(1), Money::zero())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
