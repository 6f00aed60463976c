//! Applies ledger effects to the stores
//!
//! A posting has two legs: the account leg and the allocation leg. Both are
//! always attempted. When any part fails, whatever did succeed is reversed so
//! the stores end up where they started, and every failure is reported.

use tracing::{debug, warn};

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::ledger::{AccountEffect, AllocationEffect, LedgerEffects};
use crate::models::AccountId;
use crate::storage::Stores;

/// Apply `effects`, or leave the stores untouched and return the failures
pub(crate) fn post(stores: Stores<'_>, effects: &LedgerEffects) -> Result<(), Vec<String>> {
    let mut failures = Vec::new();

    let account_applied = if effects.account.is_noop() {
        false
    } else {
        match apply_account(stores, effects.account_id, effects.account) {
            Ok(()) => true,
            Err(e) => {
                failures.push(e);
                false
            }
        }
    };

    let mut applied: Vec<AllocationEffect> = Vec::with_capacity(effects.allocations.len());
    for effect in &effects.allocations {
        match stores
            .allocations
            .adjust_spent(effect.allocation_id, effect.spent)
        {
            Ok(allocation) => {
                debug!(allocation = %allocation.id, spent = %allocation.spent, "allocation posted");
                applied.push(*effect);
            }
            Err(e) => failures.push(format!("allocation {}: {}", effect.allocation_id, e)),
        }
    }

    if failures.is_empty() {
        return Ok(());
    }

    warn!(
        account = %effects.account_id,
        failures = failures.len(),
        "posting failed, compensating applied legs"
    );

    if account_applied {
        if let Err(e) = apply_account(stores, effects.account_id, effects.account.reversed()) {
            failures.push(format!("compensation of {}", e));
        }
    }
    for effect in applied {
        let undo = effect.reversed();
        if let Err(e) = stores.allocations.adjust_spent(undo.allocation_id, undo.spent) {
            failures.push(format!(
                "compensation of allocation {}: {}",
                undo.allocation_id, e
            ));
        }
    }

    Err(failures)
}

fn apply_account(
    stores: Stores<'_>,
    account_id: AccountId,
    effect: AccountEffect,
) -> Result<(), String> {
    stores
        .accounts
        .apply_delta(account_id, effect.balance, effect.ready_to_assign)
        .map(|account| {
            debug!(
                account = %account.id,
                balance = %account.balance,
                ready_to_assign = %account.ready_to_assign,
                "account posted"
            );
        })
        .map_err(|e| format!("account {}: {}", account_id, e))
}

/// One half of a two-sided store update, with the action that undoes it
pub(crate) struct Leg<'f> {
    pub name: String,
    pub apply: Box<dyn FnOnce() -> EnvelopeResult<()> + 'f>,
    pub undo: Box<dyn FnOnce() -> EnvelopeResult<()> + 'f>,
}

impl<'f> Leg<'f> {
    pub fn new(
        name: impl Into<String>,
        apply: impl FnOnce() -> EnvelopeResult<()> + 'f,
        undo: impl FnOnce() -> EnvelopeResult<()> + 'f,
    ) -> Self {
        Self {
            name: name.into(),
            apply: Box::new(apply),
            undo: Box::new(undo),
        }
    }
}

/// Attempt every leg; if any fails, undo those that succeeded
pub(crate) fn run_legs(legs: Vec<Leg<'_>>) -> Result<(), Vec<String>> {
    let mut failures = Vec::new();
    let mut succeeded = Vec::with_capacity(legs.len());

    for leg in legs {
        match (leg.apply)() {
            Ok(()) => succeeded.push((leg.name, leg.undo)),
            Err(e) => failures.push(format!("{}: {}", leg.name, e)),
        }
    }

    if failures.is_empty() {
        return Ok(());
    }

    warn!(failures = failures.len(), "update failed, compensating applied legs");
    for (name, undo) in succeeded {
        if let Err(e) = undo() {
            failures.push(format!("compensation of {}: {}", name, e));
        }
    }

    Err(failures)
}

fn failure_messages(err: EnvelopeError) -> Vec<String> {
    match err {
        EnvelopeError::PartialUpdate { failures, .. } => failures,
        other => vec![other.to_string()],
    }
}

/// Merge an error and the error of its failed recovery into one report
pub(crate) fn combine(
    operation: String,
    first: EnvelopeError,
    second: EnvelopeError,
) -> EnvelopeError {
    let mut failures = failure_messages(first);
    failures.extend(failure_messages(second));
    EnvelopeError::PartialUpdate {
        operation,
        failures,
    }
}
