//! Account model
//!
//! Accounts hold a running balance. Checking accounts also hold the
//! "ready to assign" pool that funds envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AccountId;
use super::money::{Money, MoneyOverflow};

/// Type of financial account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Checking,
    Credit,
    Debt,
    Investment,
}

impl AccountType {
    /// Whether this account type carries a "ready to assign" pool
    pub fn has_ready_to_assign(&self) -> bool {
        matches!(self, Self::Checking)
    }

    /// Parse account type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "checking" | "courant" => Some(Self::Checking),
            "credit" | "credit_card" | "creditcard" => Some(Self::Credit),
            "debt" | "dette" => Some(Self::Debt),
            "investment" | "investissement" => Some(Self::Investment),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Checking => "Checking",
            Self::Credit => "Credit",
            Self::Debt => "Debt",
            Self::Investment => "Investment",
        };
        f.pad(label)
    }
}

/// A financial account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    pub name: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    /// Balance the account was opened with
    pub opening_balance: Money,

    /// Current balance, maintained by the ledger
    pub balance: Money,

    /// Money not yet assigned to an envelope (checking accounts only)
    #[serde(default)]
    pub ready_to_assign: Money,

    #[serde(default)]
    pub archived: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            name: name.into(),
            account_type,
            opening_balance: Money::zero(),
            balance: Money::zero(),
            ready_to_assign: Money::zero(),
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an account opened with `opening_balance`
    ///
    /// On a checking account the opening balance starts out unassigned.
    pub fn with_opening_balance(
        name: impl Into<String>,
        account_type: AccountType,
        opening_balance: Money,
    ) -> Self {
        let mut account = Self::new(name, account_type);
        account.opening_balance = opening_balance;
        account.balance = opening_balance;
        if account_type.has_ready_to_assign() {
            account.ready_to_assign = opening_balance;
        }
        account
    }

    /// Apply a balance delta and a "ready to assign" delta
    ///
    /// The pool delta is dropped for account types without a pool. Nothing
    /// changes when either sum overflows.
    pub fn apply_delta(
        &mut self,
        balance: Money,
        ready_to_assign: Money,
    ) -> Result<(), MoneyOverflow> {
        let new_balance = self.balance.checked_add(balance).ok_or(MoneyOverflow)?;
        let new_pool = if self.account_type.has_ready_to_assign() {
            self.ready_to_assign
                .checked_add(ready_to_assign)
                .ok_or(MoneyOverflow)?
        } else {
            self.ready_to_assign
        };
        self.balance = new_balance;
        self.ready_to_assign = new_pool;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Utc::now();
    }

    pub fn unarchive(&mut self) {
        self.archived = false;
        self.updated_at = Utc::now();
    }

    /// Validate the account
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }

        if self.name.len() > 100 {
            return Err(AccountValidationError::NameTooLong(self.name.len()));
        }

        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.account_type)
    }
}

/// Validation errors for accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Account name too long ({} chars, max 100)", len)
            }
        }
    }
}

impl std::error::Error for AccountValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_balance_seeds_pool_on_checking_only() {
        let checking =
            Account::with_opening_balance("Main", AccountType::Checking, Money::from_cents(10000));
        assert_eq!(checking.balance.cents(), 10000);
        assert_eq!(checking.ready_to_assign.cents(), 10000);

        let card =
            Account::with_opening_balance("Card", AccountType::Credit, Money::from_cents(-2500));
        assert_eq!(card.balance.cents(), -2500);
        assert!(card.ready_to_assign.is_zero());
    }

    #[test]
    fn test_apply_delta_ignores_pool_without_one() {
        let mut savings = Account::new("Broker", AccountType::Investment);
        savings.apply_delta(Money::from_cents(500), Money::from_cents(500)).unwrap();
        assert_eq!(savings.balance.cents(), 500);
        assert!(savings.ready_to_assign.is_zero());

        let mut checking = Account::new("Main", AccountType::Checking);
        checking.apply_delta(Money::from_cents(500), Money::from_cents(500)).unwrap();
        checking.apply_delta(Money::from_cents(-200), Money::zero()).unwrap();
        assert_eq!(checking.balance.cents(), 300);
        assert_eq!(checking.ready_to_assign.cents(), 500);
    }

    #[test]
    fn test_apply_delta_overflow_leaves_account_untouched() {
        let mut checking =
            Account::with_opening_balance("Main", AccountType::Checking, Money::from_cents(100));
        let result = checking.apply_delta(Money::from_cents(-50), Money::from_cents(i64::MAX));
        assert_eq!(result, Err(MoneyOverflow));
        assert_eq!(checking.balance.cents(), 100);
        assert_eq!(checking.ready_to_assign.cents(), 100);
    }

    #[test]
    fn test_validation() {
        let mut account = Account::new("Valid Name", AccountType::Checking);
        assert!(account.validate().is_ok());

        account.name = "  ".into();
        assert_eq!(account.validate(), Err(AccountValidationError::EmptyName));

        account.name = "a".repeat(101);
        assert!(matches!(
            account.validate(),
            Err(AccountValidationError::NameTooLong(101))
        ));
    }

    #[test]
    fn test_account_type_parsing() {
        assert_eq!(AccountType::parse("checking"), Some(AccountType::Checking));
        assert_eq!(AccountType::parse("DEBT"), Some(AccountType::Debt));
        assert_eq!(AccountType::parse("credit_card"), Some(AccountType::Credit));
        assert_eq!(AccountType::parse("savings"), None);
    }
}
