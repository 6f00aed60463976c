//! Balance effects of a single transaction
//!
//! Everything here is pure arithmetic. The services turn these effects into
//! store updates, and apply `reversed()` to undo a transaction.

use crate::models::{AccountId, AccountType, AllocationId, Money, Transaction};

/// Change to an account's balance and "ready to assign" pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountEffect {
    pub balance: Money,
    pub ready_to_assign: Money,
}

impl AccountEffect {
    /// Effect of `txn` on an account of `account_type`
    ///
    /// Inflows credit the pool as well as the balance, but only on account
    /// types that carry a pool.
    pub fn of(txn: &Transaction, account_type: AccountType) -> Self {
        let ready_to_assign =
            if txn.kind.feeds_ready_to_assign() && account_type.has_ready_to_assign() {
                txn.amount
            } else {
                Money::zero()
            };

        Self {
            balance: txn.balance_delta(),
            ready_to_assign,
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            balance: -self.balance,
            ready_to_assign: -self.ready_to_assign,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.balance.is_zero() && self.ready_to_assign.is_zero()
    }
}

/// Change to the spent total of one monthly allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationEffect {
    pub allocation_id: AllocationId,
    pub spent: Money,
}

impl AllocationEffect {
    pub fn reversed(&self) -> Self {
        Self {
            allocation_id: self.allocation_id,
            spent: -self.spent,
        }
    }
}

/// Allocation effects of `txn`, one per touched allocation
///
/// Split items posted onto the same allocation are merged. Items whose
/// allocation has not been resolved yet carry no effect.
pub fn allocation_effects(txn: &Transaction) -> Vec<AllocationEffect> {
    if !txn.kind.uses_envelope() {
        return Vec::new();
    }

    let postings: Vec<(AllocationId, Money)> = if txn.is_split() {
        txn.splits
            .iter()
            .filter_map(|item| item.allocation_id.map(|id| (id, item.amount)))
            .collect()
    } else {
        txn.allocation_id
            .map(|id| (id, txn.amount))
            .into_iter()
            .collect()
    };

    let mut effects: Vec<AllocationEffect> = Vec::with_capacity(postings.len());
    for (allocation_id, spent) in postings {
        match effects.iter_mut().find(|e| e.allocation_id == allocation_id) {
            Some(existing) => existing.spent += spent,
            None => effects.push(AllocationEffect {
                allocation_id,
                spent,
            }),
        }
    }
    effects.retain(|e| !e.spent.is_zero());
    effects
}

/// The full effect of one transaction on the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEffects {
    pub account_id: AccountId,
    pub account: AccountEffect,
    pub allocations: Vec<AllocationEffect>,
}

impl LedgerEffects {
    pub fn of(txn: &Transaction, account_type: AccountType) -> Self {
        Self {
            account_id: txn.account_id,
            account: AccountEffect::of(txn, account_type),
            allocations: allocation_effects(txn),
        }
    }

    /// The effect that exactly undoes this one
    pub fn reversed(&self) -> Self {
        Self {
            account_id: self.account_id,
            account: self.account.reversed(),
            allocations: self.allocations.iter().map(AllocationEffect::reversed).collect(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.account.is_noop() && self.allocations.is_empty()
    }

    /// Total change to spending across all allocations
    pub fn total_spent(&self) -> Money {
        self.allocations.iter().map(|e| e.spent).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnvelopeId, SplitItem, TransactionKind};
    use chrono::NaiveDate;

    fn txn(kind: TransactionKind, cents: i64) -> Transaction {
        Transaction::new(
            AccountId::new(),
            kind,
            Money::from_cents(cents),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
        )
    }

    #[test]
    fn test_account_effect_sign_table() {
        use TransactionKind::*;
        let table = [
            (Expense, -1000, 0),
            (Income, 1000, 1000),
            (Loan, -1000, 0),
            (LoanRepaymentReceived, 1000, 1000),
            (Borrowing, 1000, 1000),
            (BorrowingRepaymentGiven, -1000, 0),
            (Payment, -1000, 0),
            (TransferOut, -1000, 0),
            (TransferIn, 1000, 1000),
        ];
        for (kind, balance, pool) in table {
            let effect = AccountEffect::of(&txn(kind, 1000), AccountType::Checking);
            assert_eq!(effect.balance.cents(), balance, "{:?}", kind);
            assert_eq!(effect.ready_to_assign.cents(), pool, "{:?}", kind);
        }
    }

    #[test]
    fn test_inflow_on_account_without_pool() {
        for account_type in [AccountType::Credit, AccountType::Debt, AccountType::Investment] {
            let effect = AccountEffect::of(&txn(TransactionKind::Income, 500), account_type);
            assert_eq!(effect.balance.cents(), 500);
            assert!(effect.ready_to_assign.is_zero());
        }
    }

    #[test]
    fn test_single_envelope_expense() {
        let mut expense = txn(TransactionKind::Expense, 4200);
        let allocation = AllocationId::new();
        expense.envelope_id = Some(EnvelopeId::new());
        expense.allocation_id = Some(allocation);

        let effects = allocation_effects(&expense);
        assert_eq!(
            effects,
            vec![AllocationEffect {
                allocation_id: allocation,
                spent: Money::from_cents(4200)
            }]
        );
    }

    #[test]
    fn test_split_fans_out_and_merges_shared_allocations() {
        let groceries = AllocationId::new();
        let household = AllocationId::new();
        let mut expense = txn(TransactionKind::Expense, 10000);
        expense.splits = vec![
            SplitItem::new(EnvelopeId::new(), Money::from_cents(5000)),
            SplitItem::new(EnvelopeId::new(), Money::from_cents(3000)),
            SplitItem::new(EnvelopeId::new(), Money::from_cents(2000)),
        ];
        expense.splits[0].allocation_id = Some(groceries);
        expense.splits[1].allocation_id = Some(household);
        expense.splits[2].allocation_id = Some(groceries);

        let effects = allocation_effects(&expense);
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].allocation_id, groceries);
        assert_eq!(effects[0].spent.cents(), 7000);
        assert_eq!(effects[1].allocation_id, household);
        assert_eq!(effects[1].spent.cents(), 3000);
    }

    #[test]
    fn test_non_expense_touches_no_allocation() {
        let mut income = txn(TransactionKind::Income, 1000);
        income.allocation_id = Some(AllocationId::new());
        assert!(allocation_effects(&income).is_empty());
    }

    #[test]
    fn test_reversal_cancels_out() {
        let mut expense = txn(TransactionKind::Expense, 2500);
        expense.envelope_id = Some(EnvelopeId::new());
        expense.allocation_id = Some(AllocationId::new());

        let effects = LedgerEffects::of(&expense, AccountType::Checking);
        let reversed = effects.reversed();

        assert_eq!(effects.account.balance + reversed.account.balance, Money::zero());
        assert_eq!(
            effects.account.ready_to_assign + reversed.account.ready_to_assign,
            Money::zero()
        );
        assert_eq!(effects.total_spent() + reversed.total_spent(), Money::zero());
        assert_eq!(reversed.reversed(), effects);
        assert!(!effects.is_noop());
    }
}
