//! Transaction service
//!
//! Registers, modifies and deletes ledger transactions. Each posting touches
//! two stores: the account (balance and "ready to assign") and the monthly
//! allocations of the envelopes charged. Both legs are always attempted, and
//! a failure on either side is compensated before the error is returned.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::audit::EntityType;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::ledger::LedgerEffects;
use crate::models::{
    Account, AccountId, AccountType, AllocationId, EnvelopeId, Money, Month, MonthlyAllocation,
    SplitItem, Transaction, TransactionId, TransactionKind,
};
use crate::storage::{Storage, Stores};

use super::posting::{combine, post};

/// Service for transaction management
pub struct TransactionService<'a> {
    stores: Stores<'a>,
}

/// Options for filtering transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<AccountId>,
    /// Matches single-envelope expenses and split items
    pub envelope_id: Option<EnvelopeId>,
    pub month: Option<Month>,
    pub kind: Option<TransactionKind>,
    /// Maximum number of transactions to return
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn envelope(mut self, envelope_id: EnvelopeId) -> Self {
        self.envelope_id = Some(envelope_id);
        self
    }

    pub fn month(mut self, month: Month) -> Self {
        self.month = Some(month);
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, txn: &Transaction) -> bool {
        self.account_id.map_or(true, |id| txn.account_id == id)
            && self
                .envelope_id
                .map_or(true, |id| txn.envelope_ids().contains(&id))
            && self.month.map_or(true, |m| m.contains(txn.date))
            && self.kind.map_or(true, |k| txn.kind == k)
    }
}

/// Input for registering a new transaction
#[derive(Debug, Clone)]
pub struct RegisterTransactionInput {
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub date: NaiveDate,
    pub envelope_id: Option<EnvelopeId>,
    pub splits: Vec<SplitItem>,
    pub payee: Option<String>,
    pub note: Option<String>,
}

impl RegisterTransactionInput {
    pub fn new(
        account_id: AccountId,
        kind: TransactionKind,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        Self {
            account_id,
            kind,
            amount,
            date,
            envelope_id: None,
            splits: Vec::new(),
            payee: None,
            note: None,
        }
    }
}

/// Field changes for [`TransactionService::modify`]; `None` leaves a field alone
#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub account_id: Option<AccountId>,
    pub kind: Option<TransactionKind>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    /// `Some(None)` clears the envelope
    pub envelope_id: Option<Option<EnvelopeId>>,
    pub splits: Option<Vec<SplitItem>>,
    pub payee: Option<String>,
    pub note: Option<String>,
}

impl TransactionChanges {
    /// Whether any field with a balance effect changes
    pub fn touches_ledger(&self) -> bool {
        self.account_id.is_some()
            || self.kind.is_some()
            || self.amount.is_some()
            || self.date.is_some()
            || self.envelope_id.is_some()
            || self.splits.is_some()
    }

    fn apply_metadata(&self, txn: &mut Transaction) {
        if let Some(payee) = &self.payee {
            txn.payee = payee.trim().to_string();
        }
        if let Some(note) = &self.note {
            txn.note = note.clone();
        }
        txn.updated_at = Utc::now();
    }

    /// The replacement for `original`, keeping its id and creation time
    fn apply_to(&self, original: &Transaction) -> Transaction {
        let mut txn = original.clone();

        if let Some(account_id) = self.account_id {
            txn.account_id = account_id;
        }
        if let Some(kind) = self.kind {
            txn.kind = kind;
            // Envelopes only make sense on expenses unless asked for explicitly
            if !kind.uses_envelope() && self.envelope_id.is_none() && self.splits.is_none() {
                txn.envelope_id = None;
                txn.splits.clear();
            }
        }
        if let Some(amount) = self.amount {
            txn.amount = amount;
        }
        if let Some(date) = self.date {
            txn.date = date;
        }
        if let Some(envelope_id) = self.envelope_id {
            txn.envelope_id = envelope_id;
            if envelope_id.is_some() {
                txn.splits.clear();
            }
        }
        if let Some(splits) = &self.splits {
            txn.splits = splits.clone();
            if !splits.is_empty() {
                txn.envelope_id = None;
            }
        }

        // Re-resolved against the new envelope and month
        txn.allocation_id = None;
        for item in &mut txn.splits {
            item.allocation_id = None;
        }

        self.apply_metadata(&mut txn);
        txn
    }
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_stores(storage.stores())
    }

    pub fn with_stores(stores: Stores<'a>) -> Self {
        Self { stores }
    }

    /// Register a transaction and post it to the account and envelopes
    pub fn register(&self, input: RegisterTransactionInput) -> EnvelopeResult<Transaction> {
        if input.kind.is_transfer() {
            return Err(EnvelopeError::Validation(
                "Transfers are registered as a pair, use the transfer command".into(),
            ));
        }

        let mut txn = Transaction::new(input.account_id, input.kind, input.amount, input.date);
        txn.envelope_id = input.envelope_id;
        txn.splits = input.splits;
        if let Some(payee) = input.payee {
            txn.payee = payee.trim().to_string();
        }
        if let Some(note) = input.note {
            txn.note = note;
        }

        self.record(txn)
    }

    /// Post a fully built transaction, transfer halves included
    pub(crate) fn record(&self, txn: Transaction) -> EnvelopeResult<Transaction> {
        let txn = self.post_new(txn)?;

        self.stores.audit.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(label(&txn)),
            &txn,
        )?;

        info!(
            txn = %txn.id,
            account = %txn.account_id,
            kind = ?txn.kind,
            amount = %txn.amount,
            "transaction registered"
        );
        Ok(txn)
    }

    pub fn get(&self, id: TransactionId) -> EnvelopeResult<Option<Transaction>> {
        self.stores.transactions.get(id)
    }

    /// Find a transaction by full or short id
    pub fn find(&self, identifier: &str) -> EnvelopeResult<Option<Transaction>> {
        if let Ok(id) = identifier.trim().parse::<TransactionId>() {
            return self.stores.transactions.get(id);
        }

        let matches: Vec<Transaction> = self
            .stores
            .transactions
            .list()?
            .into_iter()
            .filter(|t| t.id.matches_short(identifier.trim()))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.into_iter().next()),
            n => Err(EnvelopeError::Validation(format!(
                "Id '{}' is ambiguous ({} transactions match)",
                identifier, n
            ))),
        }
    }

    pub fn resolve(&self, identifier: &str) -> EnvelopeResult<Transaction> {
        self.find(identifier)?
            .ok_or_else(|| EnvelopeError::transaction_not_found(identifier))
    }

    /// Transactions matching `filter`, newest first
    pub fn list(&self, filter: TransactionFilter) -> EnvelopeResult<Vec<Transaction>> {
        let mut transactions = match filter.account_id {
            Some(account_id) => self.stores.transactions.by_account(account_id)?,
            None => self.stores.transactions.list()?,
        };

        transactions.retain(|t| filter.matches(t));

        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }

        Ok(transactions)
    }

    /// Change a transaction, reposting it when the change affects balances
    ///
    /// A ledger change is done as delete-then-recreate under the same id. If
    /// the recreation fails the original is posted back.
    pub fn modify(
        &self,
        id: TransactionId,
        changes: TransactionChanges,
    ) -> EnvelopeResult<Transaction> {
        let original = self.require(id)?;

        if !changes.touches_ledger() {
            let mut txn = original.clone();
            changes.apply_metadata(&mut txn);
            self.stores.transactions.insert(txn.clone())?;
            self.stores.audit.log_update(
                EntityType::Transaction,
                txn.id.to_string(),
                Some(label(&txn)),
                &original,
                &txn,
                None,
            )?;
            return Ok(txn);
        }

        if original.is_transfer() {
            return Err(EnvelopeError::Validation(
                "Only the payee and note of a transfer can be edited; \
                 delete and re-create it instead"
                    .into(),
            ));
        }

        if changes.kind.is_some_and(|kind| kind.is_transfer()) {
            return Err(EnvelopeError::Validation(
                "A transaction cannot become a transfer half; use the transfer command".into(),
            ));
        }

        let replacement = changes.apply_to(&original);
        replacement
            .validate()
            .map_err(|e| EnvelopeError::Validation(e.to_string()))?;
        self.check_references(&replacement)?;

        self.retract(&original)?;

        let updated = match self.post_new(replacement) {
            Ok(updated) => updated,
            Err(err) => {
                warn!(txn = %id, error = %err, "modification failed, restoring original");
                return match self.reinstate(original) {
                    Ok(_) => Err(err),
                    Err(restore_err) => Err(combine(
                        format!("modify transaction {}", id),
                        err,
                        restore_err,
                    )),
                };
            }
        };

        self.stores.audit.log_update(
            EntityType::Transaction,
            updated.id.to_string(),
            Some(label(&updated)),
            &original,
            &updated,
            None,
        )?;

        info!(txn = %updated.id, amount = %updated.amount, "transaction modified");
        Ok(updated)
    }

    /// Delete a transaction and reverse its effects
    ///
    /// Deleting either half of a transfer deletes both. Returns everything
    /// that was deleted.
    pub fn delete(&self, id: TransactionId) -> EnvelopeResult<Vec<Transaction>> {
        let txn = self.require(id)?;
        let linked = self.stores.transactions.linked(id)?;

        self.retract(&txn)?;

        if let Some(linked) = &linked {
            if let Err(err) = self.retract(linked) {
                warn!(txn = %id, linked = %linked.id, "linked delete failed, restoring transfer");
                return match self.reinstate(txn) {
                    Ok(_) => Err(err),
                    Err(restore_err) => Err(combine(
                        format!("delete transaction {}", id),
                        err,
                        restore_err,
                    )),
                };
            }
        }

        let deleted: Vec<Transaction> = std::iter::once(txn).chain(linked).collect();
        for txn in &deleted {
            self.stores.audit.log_delete(
                EntityType::Transaction,
                txn.id.to_string(),
                Some(label(txn)),
                txn,
            )?;
            info!(txn = %txn.id, account = %txn.account_id, "transaction deleted");
        }

        Ok(deleted)
    }

    fn require(&self, id: TransactionId) -> EnvelopeResult<Transaction> {
        self.stores
            .transactions
            .get(id)?
            .ok_or_else(|| EnvelopeError::transaction_not_found(id.to_string()))
    }

    fn load_account(&self, id: AccountId) -> EnvelopeResult<Account> {
        self.stores
            .accounts
            .get(id)?
            .ok_or_else(|| EnvelopeError::account_not_found(id.to_string()))
    }

    /// The account must be active, and so must every envelope charged
    fn check_references(&self, txn: &Transaction) -> EnvelopeResult<Account> {
        let account = self.load_account(txn.account_id)?;
        if account.archived {
            return Err(EnvelopeError::Validation(format!(
                "Cannot add transactions to archived account '{}'",
                account.name
            )));
        }

        for envelope_id in txn.envelope_ids() {
            let envelope = self
                .stores
                .envelopes
                .get(envelope_id)?
                .ok_or_else(|| EnvelopeError::envelope_not_found(envelope_id.to_string()))?;
            if envelope.archived {
                return Err(EnvelopeError::Validation(format!(
                    "Cannot charge archived envelope '{}'",
                    envelope.name
                )));
            }
        }

        Ok(account)
    }

    /// Validate, resolve allocations, insert and post; no audit entry
    fn post_new(&self, mut txn: Transaction) -> EnvelopeResult<Transaction> {
        txn.validate()
            .map_err(|e| EnvelopeError::Validation(e.to_string()))?;
        let account = self.check_references(&txn)?;
        self.resolve_allocations(&mut txn)?;
        self.apply(txn, account.account_type)
    }

    /// Post an already resolved transaction back, e.g. after a failed edit
    fn reinstate(&self, txn: Transaction) -> EnvelopeResult<Transaction> {
        let account = self.load_account(txn.account_id)?;
        self.apply(txn, account.account_type)
    }

    fn apply(&self, txn: Transaction, account_type: AccountType) -> EnvelopeResult<Transaction> {
        self.stores.transactions.insert(txn.clone())?;

        let effects = LedgerEffects::of(&txn, account_type);
        if let Err(mut failures) = post(self.stores, &effects) {
            if let Err(e) = self.stores.transactions.remove(txn.id) {
                failures.push(format!("removal of transaction {}: {}", txn.id, e));
            }
            return Err(EnvelopeError::PartialUpdate {
                operation: format!("register transaction {}", txn.id),
                failures,
            });
        }

        Ok(txn)
    }

    /// Reverse a transaction's effects and remove its row; no audit entry
    fn retract(&self, txn: &Transaction) -> EnvelopeResult<()> {
        let account = self.load_account(txn.account_id)?;
        let reversal = LedgerEffects::of(txn, account.account_type).reversed();

        post(self.stores, &reversal).map_err(|failures| EnvelopeError::PartialUpdate {
            operation: format!("reverse transaction {}", txn.id),
            failures,
        })?;

        if let Err(e) = self.stores.transactions.remove(txn.id) {
            let mut failures = vec![format!("removal of transaction {}: {}", txn.id, e)];
            if let Err(more) = post(self.stores, &reversal.reversed()) {
                failures.extend(more);
            }
            return Err(EnvelopeError::PartialUpdate {
                operation: format!("reverse transaction {}", txn.id),
                failures,
            });
        }

        Ok(())
    }

    /// Point the envelope and every split item at an allocation of the
    /// transaction's month
    fn resolve_allocations(&self, txn: &mut Transaction) -> EnvelopeResult<()> {
        let month = txn.month();

        if let Some(envelope_id) = txn.envelope_id {
            if txn.allocation_id.is_none() {
                txn.allocation_id = Some(self.allocation_for(envelope_id, month)?);
            }
        }

        for item in &mut txn.splits {
            if item.allocation_id.is_none() {
                item.allocation_id = Some(self.allocation_for(item.envelope_id, month)?);
            }
        }

        Ok(())
    }

    /// The latest allocation for the pair, or a new empty one
    fn allocation_for(
        &self,
        envelope_id: EnvelopeId,
        month: Month,
    ) -> EnvelopeResult<AllocationId> {
        if let Some(latest) = self.stores.allocations.latest_for(envelope_id, month)? {
            debug!(
                envelope = %envelope_id,
                %month,
                allocation = %latest.id,
                "using latest allocation"
            );
            return Ok(latest.id);
        }

        let allocation = MonthlyAllocation::empty(envelope_id, month);
        self.stores.allocations.insert(allocation.clone())?;
        self.stores.audit.log_create(
            EntityType::Allocation,
            allocation.id.to_string(),
            Some(format!("{} spending", month)),
            &allocation,
        )?;

        debug!(
            envelope = %envelope_id,
            %month,
            allocation = %allocation.id,
            "created empty allocation"
        );
        Ok(allocation.id)
    }
}

fn label(txn: &Transaction) -> String {
    if txn.payee.is_empty() {
        format!("{} {}", txn.date, txn.kind)
    } else {
        format!("{} {}", txn.date, txn.payee)
    }
}
