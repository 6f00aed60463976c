//! Transfer service
//!
//! A transfer is a linked pair: a `TransferOut` on the source account and a
//! `TransferIn` on the destination, each pointing at the other.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{Account, AccountId, Money, Transaction, TransactionKind};
use crate::storage::{Storage, Stores};

use super::posting::combine;
use super::transaction::TransactionService;

pub struct TransferService<'a> {
    stores: Stores<'a>,
}

/// Both halves of a transfer
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub from_transaction: Transaction,
    pub to_transaction: Transaction,
}

impl<'a> TransferService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_stores(storage.stores())
    }

    pub fn with_stores(stores: Stores<'a>) -> Self {
        Self { stores }
    }

    pub fn transfer(
        &self,
        from_account_id: AccountId,
        to_account_id: AccountId,
        amount: Money,
        date: NaiveDate,
        note: Option<String>,
    ) -> EnvelopeResult<TransferResult> {
        if !amount.is_positive() {
            return Err(EnvelopeError::Validation(
                "Transfer amount must be positive".into(),
            ));
        }
        if from_account_id == to_account_id {
            return Err(EnvelopeError::Validation(
                "Cannot transfer to the same account".into(),
            ));
        }

        let from_account = self.active_account(from_account_id)?;
        let to_account = self.active_account(to_account_id)?;

        let mut from_txn =
            Transaction::new(from_account_id, TransactionKind::TransferOut, amount, date);
        from_txn.payee = format!("Transfer to {}", to_account.name);

        let mut to_txn = Transaction::new(to_account_id, TransactionKind::TransferIn, amount, date);
        to_txn.payee = format!("Transfer from {}", from_account.name);

        if let Some(note) = note {
            from_txn.note.clone_from(&note);
            to_txn.note = note;
        }

        from_txn.transfer_transaction_id = Some(to_txn.id);
        to_txn.transfer_transaction_id = Some(from_txn.id);

        let transactions = TransactionService::with_stores(self.stores);
        let from_txn = transactions.record(from_txn)?;

        let to_txn = match transactions.record(to_txn) {
            Ok(txn) => txn,
            Err(err) => {
                warn!(txn = %from_txn.id, error = %err, "inflow leg failed, removing outflow");
                return match transactions.delete(from_txn.id) {
                    Ok(_) => Err(err),
                    Err(undo_err) => Err(combine(
                        format!("transfer {} to {}", from_account.name, to_account.name),
                        err,
                        undo_err,
                    )),
                };
            }
        };

        info!(
            from = %from_account.id,
            to = %to_account.id,
            %amount,
            "transfer registered"
        );

        Ok(TransferResult {
            from_transaction: from_txn,
            to_transaction: to_txn,
        })
    }

    fn active_account(&self, id: AccountId) -> EnvelopeResult<Account> {
        let account = self
            .stores
            .accounts
            .get(id)?
            .ok_or_else(|| EnvelopeError::account_not_found(id.to_string()))?;

        if account.archived {
            return Err(EnvelopeError::Validation(format!(
                "Account '{}' is archived",
                account.name
            )));
        }
        Ok(account)
    }
}
