//! Account service
//!
//! Account management plus a consistency check that recomputes the balance
//! from the transaction history.

use chrono::Utc;
use tracing::info;

use crate::audit::EntityType;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{Account, AccountId, AccountType, Money};
use crate::storage::{Storage, Stores};

/// Service for account management
pub struct AccountService<'a> {
    stores: Stores<'a>,
}

/// Stored balance compared with the balance implied by the history
#[derive(Debug, Clone)]
pub struct BalanceCheck {
    pub account: Account,
    /// Opening balance plus the signed amounts of every transaction
    pub expected: Money,
    pub transaction_count: usize,
}

impl BalanceCheck {
    /// Stored balance minus expected balance
    pub fn drift(&self) -> Money {
        self.account.balance - self.expected
    }

    pub fn is_consistent(&self) -> bool {
        self.drift().is_zero()
    }
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_stores(storage.stores())
    }

    pub fn with_stores(stores: Stores<'a>) -> Self {
        Self { stores }
    }

    /// Create a new account
    pub fn create(
        &self,
        name: &str,
        account_type: AccountType,
        opening_balance: Money,
    ) -> EnvelopeResult<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EnvelopeError::Validation(
                "Account name cannot be empty".into(),
            ));
        }

        if self.name_taken(name, None)? {
            return Err(EnvelopeError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let account = Account::with_opening_balance(name, account_type, opening_balance);
        account
            .validate()
            .map_err(|e| EnvelopeError::Validation(e.to_string()))?;

        self.stores.accounts.upsert(account.clone())?;

        self.stores.audit.log_create(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &account,
        )?;

        info!(account = %account.id, name = %account.name, "account created");
        Ok(account)
    }

    pub fn get(&self, id: AccountId) -> EnvelopeResult<Option<Account>> {
        self.stores.accounts.get(id)
    }

    /// Find an account by name (case-insensitive) or id
    pub fn find(&self, identifier: &str) -> EnvelopeResult<Option<Account>> {
        let accounts = self.stores.accounts.list()?;
        let lowered = identifier.trim().to_lowercase();

        if let Some(account) = accounts.iter().find(|a| a.name.to_lowercase() == lowered) {
            return Ok(Some(account.clone()));
        }

        if let Ok(id) = identifier.parse::<AccountId>() {
            return self.stores.accounts.get(id);
        }

        Ok(accounts.into_iter().find(|a| a.id.matches_short(identifier)))
    }

    /// Like [`find`](Self::find), but a missing account is an error
    pub fn resolve(&self, identifier: &str) -> EnvelopeResult<Account> {
        self.find(identifier)?
            .ok_or_else(|| EnvelopeError::account_not_found(identifier))
    }

    pub fn list(&self, include_archived: bool) -> EnvelopeResult<Vec<Account>> {
        let mut accounts = self.stores.accounts.list()?;
        if !include_archived {
            accounts.retain(|a| !a.archived);
        }
        Ok(accounts)
    }

    /// Sum of "ready to assign" over active accounts
    pub fn total_ready_to_assign(&self) -> EnvelopeResult<Money> {
        Ok(self.list(false)?.iter().map(|a| a.ready_to_assign).sum())
    }

    pub fn rename(&self, id: AccountId, new_name: &str) -> EnvelopeResult<Account> {
        let new_name = new_name.trim();
        if self.name_taken(new_name, Some(id))? {
            return Err(EnvelopeError::Duplicate {
                entity_type: "Account",
                identifier: new_name.to_string(),
            });
        }

        self.update(id, |account| account.name = new_name.to_string())
    }

    pub fn archive(&self, id: AccountId) -> EnvelopeResult<Account> {
        let account = self.require(id)?;
        if account.archived {
            return Err(EnvelopeError::Validation(format!(
                "Account '{}' is already archived",
                account.name
            )));
        }
        self.update(id, Account::archive)
    }

    pub fn unarchive(&self, id: AccountId) -> EnvelopeResult<Account> {
        let account = self.require(id)?;
        if !account.archived {
            return Err(EnvelopeError::Validation(format!(
                "Account '{}' is not archived",
                account.name
            )));
        }
        self.update(id, Account::unarchive)
    }

    /// Recompute the balance from history and compare with the stored one
    pub fn check_balance(&self, id: AccountId) -> EnvelopeResult<BalanceCheck> {
        let account = self.require(id)?;
        let transactions = self.stores.transactions.by_account(id)?;
        let expected = account.opening_balance
            + transactions.iter().map(|t| t.balance_delta()).sum::<Money>();

        Ok(BalanceCheck {
            account,
            expected,
            transaction_count: transactions.len(),
        })
    }

    fn require(&self, id: AccountId) -> EnvelopeResult<Account> {
        self.stores
            .accounts
            .get(id)?
            .ok_or_else(|| EnvelopeError::account_not_found(id.to_string()))
    }

    fn name_taken(&self, name: &str, exclude: Option<AccountId>) -> EnvelopeResult<bool> {
        let lowered = name.to_lowercase();
        Ok(self
            .stores
            .accounts
            .list()?
            .iter()
            .any(|a| Some(a.id) != exclude && a.name.to_lowercase() == lowered))
    }

    fn update(&self, id: AccountId, change: impl FnOnce(&mut Account)) -> EnvelopeResult<Account> {
        let mut account = self.require(id)?;
        let before = account.clone();

        change(&mut account);
        account.updated_at = Utc::now();
        account
            .validate()
            .map_err(|e| EnvelopeError::Validation(e.to_string()))?;

        self.stores.accounts.upsert(account.clone())?;

        self.stores.audit.log_update(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &before,
            &account,
            None,
        )?;

        Ok(account)
    }
}
