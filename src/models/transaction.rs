//! Transaction model
//!
//! A transaction has one of nine kinds. The kind decides the sign of the
//! balance change; the stored amount is always a positive magnitude.
//! Expenses may point at one envelope, or be split across several.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, AllocationId, EnvelopeId, TransactionId};
use super::money::Money;
use super::month::Month;

/// The kind of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money spent, usually against an envelope
    Expense,
    /// Money earned
    Income,
    /// Money lent to someone
    Loan,
    /// Someone paying back a loan we gave
    LoanRepaymentReceived,
    /// Money borrowed from someone
    Borrowing,
    /// Paying back money we borrowed
    BorrowingRepaymentGiven,
    /// A payment, e.g. a card or debt payment
    Payment,
    /// Outgoing half of a transfer
    TransferOut,
    /// Incoming half of a transfer
    TransferIn,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 9] = [
        Self::Expense,
        Self::Income,
        Self::Loan,
        Self::LoanRepaymentReceived,
        Self::Borrowing,
        Self::BorrowingRepaymentGiven,
        Self::Payment,
        Self::TransferOut,
        Self::TransferIn,
    ];

    /// Sign applied to the account balance: +1 for inflows, -1 for outflows
    pub const fn sign(&self) -> i64 {
        if self.is_inflow() {
            1
        } else {
            -1
        }
    }

    /// Money coming into the account
    pub const fn is_inflow(&self) -> bool {
        matches!(
            self,
            Self::Income | Self::LoanRepaymentReceived | Self::Borrowing | Self::TransferIn
        )
    }

    /// Inflows also land in the "ready to assign" pool
    pub const fn feeds_ready_to_assign(&self) -> bool {
        self.is_inflow()
    }

    /// Only expenses are charged against envelopes
    pub const fn uses_envelope(&self) -> bool {
        matches!(self, Self::Expense)
    }

    pub const fn is_transfer(&self) -> bool {
        matches!(self, Self::TransferOut | Self::TransferIn)
    }

    /// Parse kind names such as "expense", "loan-repayment-received", "transfer_in"
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(&['-', ' '][..], "_");
        match normalized.as_str() {
            "expense" | "depense" => Some(Self::Expense),
            "income" | "revenu" => Some(Self::Income),
            "loan" | "pret" => Some(Self::Loan),
            "loan_repayment_received" | "loan_repayment" => Some(Self::LoanRepaymentReceived),
            "borrowing" | "emprunt" => Some(Self::Borrowing),
            "borrowing_repayment_given" | "borrowing_repayment" => {
                Some(Self::BorrowingRepaymentGiven)
            }
            "payment" | "paiement" => Some(Self::Payment),
            "transfer_out" => Some(Self::TransferOut),
            "transfer_in" => Some(Self::TransferIn),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Expense => "Expense",
            Self::Income => "Income",
            Self::Loan => "Loan",
            Self::LoanRepaymentReceived => "Loan repayment received",
            Self::Borrowing => "Borrowing",
            Self::BorrowingRepaymentGiven => "Borrowing repayment given",
            Self::Payment => "Payment",
            Self::TransferOut => "Transfer out",
            Self::TransferIn => "Transfer in",
        };
        f.pad(label)
    }
}

/// One envelope share of a split expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitItem {
    pub envelope_id: EnvelopeId,

    /// Allocation the share was posted onto, set when the transaction is registered
    #[serde(default)]
    pub allocation_id: Option<AllocationId>,

    /// Positive share of the parent amount
    pub amount: Money,

    #[serde(default)]
    pub note: String,
}

impl SplitItem {
    pub fn new(envelope_id: EnvelopeId, amount: Money) -> Self {
        Self {
            envelope_id,
            allocation_id: None,
            amount,
            note: String::new(),
        }
    }

    pub fn with_note(envelope_id: EnvelopeId, amount: Money, note: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            ..Self::new(envelope_id, amount)
        }
    }
}

/// A recorded transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub account_id: AccountId,

    pub kind: TransactionKind,

    /// Positive magnitude; the sign comes from `kind`
    pub amount: Money,

    pub date: NaiveDate,

    /// Envelope charged by a single-envelope expense
    #[serde(default)]
    pub envelope_id: Option<EnvelopeId>,

    /// Allocation the expense was posted onto
    #[serde(default)]
    pub allocation_id: Option<AllocationId>,

    /// Sub-items of a split expense
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<SplitItem>,

    #[serde(default)]
    pub payee: String,

    #[serde(default)]
    pub note: String,

    /// The other half of a transfer
    #[serde(default)]
    pub transfer_transaction_id: Option<TransactionId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        account_id: AccountId,
        kind: TransactionKind,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            account_id,
            kind,
            amount,
            date,
            envelope_id: None,
            allocation_id: None,
            splits: Vec::new(),
            payee: String::new(),
            note: String::new(),
            transfer_transaction_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Expense charged against a single envelope
    pub fn expense(
        account_id: AccountId,
        envelope_id: EnvelopeId,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        let mut txn = Self::new(account_id, TransactionKind::Expense, amount, date);
        txn.envelope_id = Some(envelope_id);
        txn
    }

    pub fn is_split(&self) -> bool {
        !self.splits.is_empty()
    }

    pub fn is_transfer(&self) -> bool {
        self.transfer_transaction_id.is_some()
    }

    /// Month whose allocations this transaction touches
    pub fn month(&self) -> Month {
        Month::from_date(self.date)
    }

    /// Change applied to the account balance
    pub fn balance_delta(&self) -> Money {
        self.amount.signed(self.kind.sign())
    }

    pub fn splits_total(&self) -> Money {
        self.splits.iter().map(|s| s.amount).sum()
    }

    /// Every envelope this transaction charges
    pub fn envelope_ids(&self) -> Vec<EnvelopeId> {
        let mut ids: Vec<EnvelopeId> = self
            .envelope_id
            .into_iter()
            .chain(self.splits.iter().map(|s| s.envelope_id))
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }

        if self.envelope_id.is_some() && self.is_split() {
            return Err(TransactionValidationError::EnvelopeAndSplits);
        }

        if !self.kind.uses_envelope() && (self.envelope_id.is_some() || self.is_split()) {
            return Err(TransactionValidationError::EnvelopeNotAllowed(self.kind));
        }

        if self.is_split() {
            if let Some(item) = self.splits.iter().find(|s| !s.amount.is_positive()) {
                return Err(TransactionValidationError::NonPositiveSplit(item.amount));
            }
            let splits_total = self.splits_total();
            if splits_total != self.amount {
                return Err(TransactionValidationError::SplitsMismatch {
                    transaction_amount: self.amount,
                    splits_total,
                });
            }
        }

        if self.is_transfer() && !self.kind.is_transfer() {
            return Err(TransactionValidationError::TransferLinkNotAllowed(self.kind));
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.date.format("%Y-%m-%d"),
            self.kind,
            self.payee,
            self.balance_delta()
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    NonPositiveSplit(Money),
    SplitsMismatch {
        transaction_amount: Money,
        splits_total: Money,
    },
    EnvelopeAndSplits,
    EnvelopeNotAllowed(TransactionKind),
    TransferLinkNotAllowed(TransactionKind),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Transaction amount must be positive, got {}", amount)
            }
            Self::NonPositiveSplit(amount) => {
                write!(f, "Split amounts must be positive, got {}", amount)
            }
            Self::SplitsMismatch {
                transaction_amount,
                splits_total,
            } => write!(
                f,
                "Split totals ({}) do not match transaction amount ({})",
                splits_total, transaction_amount
            ),
            Self::EnvelopeAndSplits => {
                write!(f, "Transaction cannot have both an envelope and splits")
            }
            Self::EnvelopeNotAllowed(kind) => {
                write!(f, "{} transactions cannot be charged to an envelope", kind)
            }
            Self::TransferLinkNotAllowed(kind) => {
                write!(f, "{} transactions cannot be linked as a transfer", kind)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}
