//! Budget service
//!
//! Moves money between a checking account's "ready to assign" pool and
//! envelope allocations, and reports per-month envelope state. Every
//! contribution inserts a new allocation; existing rows are never edited here.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{
    Account, AccountId, AllocationTotals, Envelope, EnvelopeId, Money, Month, MonthlyAllocation,
};
use crate::storage::{Storage, Stores};

use super::posting::{run_legs, Leg};
use super::AccountService;

pub struct BudgetService<'a> {
    stores: Stores<'a>,
}

/// One envelope's state for one month
#[derive(Debug, Clone)]
pub struct EnvelopeSummary {
    pub envelope: Envelope,
    pub month: Month,
    pub totals: AllocationTotals,
    /// What the objective asks for this month (zero without an objective)
    pub requirement: Money,
    /// `max(0, requirement - allocated)`
    pub shortfall: Money,
    pub allocation_count: usize,
}

/// Every active envelope for a month
#[derive(Debug, Clone)]
pub struct MonthOverview {
    pub month: Month,
    pub envelopes: Vec<EnvelopeSummary>,
    pub totals: AllocationTotals,
    pub ready_to_assign: Money,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_stores(storage.stores())
    }

    pub fn with_stores(stores: Stores<'a>) -> Self {
        Self { stores }
    }

    /// Move `amount` from a checking account's pool into an envelope
    pub fn assign(
        &self,
        account_id: AccountId,
        envelope_id: EnvelopeId,
        month: Month,
        amount: Money,
    ) -> EnvelopeResult<MonthlyAllocation> {
        require_positive(amount)?;
        let account = self.pool_account(account_id)?;
        let envelope = self.active_envelope(envelope_id)?;

        if account.ready_to_assign < amount {
            return Err(EnvelopeError::InsufficientFunds {
                source_name: account.name,
                needed: amount,
                available: account.ready_to_assign,
            });
        }

        let allocation = MonthlyAllocation::contribution(envelope.id, month, amount);
        let stores = self.stores;
        let allocation_id = allocation.id;
        let row = allocation.clone();

        run_legs(vec![
            Leg::new(
                format!("account {}", account.id),
                move || stores.accounts.apply_delta(account_id, Money::zero(), -amount).map(drop),
                move || stores.accounts.apply_delta(account_id, Money::zero(), amount).map(drop),
            ),
            Leg::new(
                format!("allocation {}", allocation_id),
                move || stores.allocations.insert(row),
                move || stores.allocations.remove(allocation_id).map(drop),
            ),
        ])
        .map_err(|failures| EnvelopeError::PartialUpdate {
            operation: format!("assign to {}", envelope.name),
            failures,
        })?;

        self.stores.audit.log_create(
            EntityType::Allocation,
            allocation.id.to_string(),
            Some(format!("{} {}", envelope.name, month)),
            &allocation,
        )?;

        info!(
            account = %account.id,
            envelope = %envelope.id,
            %month,
            %amount,
            "funds assigned"
        );
        Ok(allocation)
    }

    /// Return `amount` from an envelope to a checking account's pool
    pub fn release(
        &self,
        envelope_id: EnvelopeId,
        account_id: AccountId,
        month: Month,
        amount: Money,
    ) -> EnvelopeResult<MonthlyAllocation> {
        require_positive(amount)?;
        let account = self.pool_account(account_id)?;
        let envelope = self.active_envelope(envelope_id)?;
        self.require_remaining(&envelope, month, amount)?;

        let allocation = MonthlyAllocation::contribution(envelope.id, month, -amount);
        let stores = self.stores;
        let allocation_id = allocation.id;
        let row = allocation.clone();

        run_legs(vec![
            Leg::new(
                format!("allocation {}", allocation_id),
                move || stores.allocations.insert(row),
                move || stores.allocations.remove(allocation_id).map(drop),
            ),
            Leg::new(
                format!("account {}", account.id),
                move || stores.accounts.apply_delta(account_id, Money::zero(), amount).map(drop),
                move || stores.accounts.apply_delta(account_id, Money::zero(), -amount).map(drop),
            ),
        ])
        .map_err(|failures| EnvelopeError::PartialUpdate {
            operation: format!("release from {}", envelope.name),
            failures,
        })?;

        self.stores.audit.log_create(
            EntityType::Allocation,
            allocation.id.to_string(),
            Some(format!("{} {}", envelope.name, month)),
            &allocation,
        )?;

        info!(
            account = %account.id,
            envelope = %envelope.id,
            %month,
            %amount,
            "funds released"
        );
        Ok(allocation)
    }

    /// Move `amount` between two envelopes within a month
    ///
    /// Returns the (outgoing, incoming) allocations.
    pub fn move_funds(
        &self,
        from_id: EnvelopeId,
        to_id: EnvelopeId,
        month: Month,
        amount: Money,
    ) -> EnvelopeResult<(MonthlyAllocation, MonthlyAllocation)> {
        require_positive(amount)?;
        if from_id == to_id {
            return Err(EnvelopeError::Validation(
                "Cannot move funds to the same envelope".into(),
            ));
        }

        let from = self.active_envelope(from_id)?;
        let to = self.active_envelope(to_id)?;
        self.require_remaining(&from, month, amount)?;

        let outgoing = MonthlyAllocation::contribution(from.id, month, -amount);
        let incoming = MonthlyAllocation::contribution(to.id, month, amount);
        let stores = self.stores;
        let (out_id, in_id) = (outgoing.id, incoming.id);
        let (out_row, in_row) = (outgoing.clone(), incoming.clone());

        run_legs(vec![
            Leg::new(
                format!("allocation {}", out_id),
                move || stores.allocations.insert(out_row),
                move || stores.allocations.remove(out_id).map(drop),
            ),
            Leg::new(
                format!("allocation {}", in_id),
                move || stores.allocations.insert(in_row),
                move || stores.allocations.remove(in_id).map(drop),
            ),
        ])
        .map_err(|failures| EnvelopeError::PartialUpdate {
            operation: format!("move from {} to {}", from.name, to.name),
            failures,
        })?;

        for (allocation, envelope) in [(&outgoing, &from), (&incoming, &to)] {
            self.stores.audit.log_create(
                EntityType::Allocation,
                allocation.id.to_string(),
                Some(format!("{} {}", envelope.name, month)),
                allocation,
            )?;
        }

        info!(from = %from.id, to = %to.id, %month, %amount, "funds moved");
        Ok((outgoing, incoming))
    }

    pub fn envelope_summary(
        &self,
        envelope_id: EnvelopeId,
        month: Month,
    ) -> EnvelopeResult<EnvelopeSummary> {
        let envelope = self
            .stores
            .envelopes
            .get(envelope_id)?
            .ok_or_else(|| EnvelopeError::envelope_not_found(envelope_id.to_string()))?;
        self.summarize(envelope, month)
    }

    pub fn month_overview(&self, month: Month) -> EnvelopeResult<MonthOverview> {
        let mut envelopes = Vec::new();
        for envelope in self.stores.envelopes.list()? {
            if !envelope.archived {
                envelopes.push(self.summarize(envelope, month)?);
            }
        }

        let totals = envelopes
            .iter()
            .fold(AllocationTotals::default(), |acc, s| acc + s.totals);

        let ready_to_assign = AccountService::with_stores(self.stores).total_ready_to_assign()?;

        Ok(MonthOverview {
            month,
            envelopes,
            totals,
            ready_to_assign,
        })
    }

    fn summarize(&self, envelope: Envelope, month: Month) -> EnvelopeResult<EnvelopeSummary> {
        let allocations = self.stores.allocations.for_envelope_month(envelope.id, month)?;
        let totals = AllocationTotals::of(&allocations);
        let requirement = envelope
            .objective
            .map(|o| o.monthly_requirement(month))
            .unwrap_or_default();
        let shortfall = if requirement > totals.allocated {
            requirement - totals.allocated
        } else {
            Money::zero()
        };

        Ok(EnvelopeSummary {
            envelope,
            month,
            totals,
            requirement,
            shortfall,
            allocation_count: allocations.len(),
        })
    }

    fn require_remaining(
        &self,
        envelope: &Envelope,
        month: Month,
        amount: Money,
    ) -> EnvelopeResult<()> {
        let allocations = self.stores.allocations.for_envelope_month(envelope.id, month)?;
        let available = AllocationTotals::of(&allocations).remaining;
        if available < amount {
            return Err(EnvelopeError::InsufficientFunds {
                source_name: envelope.name.clone(),
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// An active account that carries a "ready to assign" pool
    fn pool_account(&self, id: AccountId) -> EnvelopeResult<Account> {
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
        if !account.account_type.has_ready_to_assign() {
            return Err(EnvelopeError::Budget(format!(
                "Account '{}' is a {} account; only checking accounts hold money to assign",
                account.name, account.account_type
            )));
        }
        Ok(account)
    }

    fn active_envelope(&self, id: EnvelopeId) -> EnvelopeResult<Envelope> {
        let envelope = self
            .stores
            .envelopes
            .get(id)?
            .ok_or_else(|| EnvelopeError::envelope_not_found(id.to_string()))?;

        if envelope.archived {
            return Err(EnvelopeError::Validation(format!(
                "Envelope '{}' is archived",
                envelope.name
            )));
        }
        Ok(envelope)
    }
}

fn require_positive(amount: Money) -> EnvelopeResult<()> {
    if !amount.is_positive() {
        return Err(EnvelopeError::Validation(format!(
            "Amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, Cadence, Objective};
    use crate::services::testing::{
        create_test_storage, with_accounts, with_allocations, FailingAccounts, FailingAllocations,
    };
    use crate::services::{AccountService, EnvelopeService};
    use crate::storage::{AccountStore, AllocationStore};

    fn march() -> Month {
        Month::new(2025, 3).unwrap()
    }

    fn setup(storage: &Storage) -> (AccountId, EnvelopeId, EnvelopeId) {
        let account = AccountService::new(storage)
            .create("Checking", AccountType::Checking, Money::from_cents(100000))
            .unwrap();
        let envelopes = EnvelopeService::new(storage);
        let groceries = envelopes.create("Groceries", None, None).unwrap();
        let fuel = envelopes.create("Fuel", None, None).unwrap();
        (account.id, groceries.id, fuel.id)
    }

    #[test]
    fn test_assign_moves_pool_into_new_allocation() {
        let (_temp_dir, storage) = create_test_storage();
        let (account_id, groceries, _) = setup(&storage);
        let service = BudgetService::new(&storage);

        service.assign(account_id, groceries, march(), Money::from_cents(30000)).unwrap();
        service.assign(account_id, groceries, march(), Money::from_cents(10000)).unwrap();

        let account = storage.stores().accounts.get(account_id).unwrap().unwrap();
        assert_eq!(account.ready_to_assign.cents(), 60000);
        assert_eq!(account.balance.cents(), 100000);

        let summary = service.envelope_summary(groceries, march()).unwrap();
        assert_eq!(summary.allocation_count, 2);
        assert_eq!(summary.totals.allocated.cents(), 40000);
        assert_eq!(summary.totals.remaining.cents(), 40000);
    }

    #[test]
    fn test_assign_insufficient_pool() {
        let (_temp_dir, storage) = create_test_storage();
        let (account_id, groceries, _) = setup(&storage);
        let service = BudgetService::new(&storage);

        let err = service
            .assign(account_id, groceries, march(), Money::from_cents(100001))
            .unwrap_err();
        match err {
            EnvelopeError::InsufficientFunds { needed, available, .. } => {
                assert_eq!(needed.cents(), 100001);
                assert_eq!(available.cents(), 100000);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(storage.stores().allocations.for_month(march()).unwrap().is_empty());
    }

    #[test]
    fn test_assign_requires_checking_account() {
        let (_temp_dir, storage) = create_test_storage();
        let (_, groceries, _) = setup(&storage);
        let card = AccountService::new(&storage)
            .create("Card", AccountType::Credit, Money::zero())
            .unwrap();

        let err = BudgetService::new(&storage)
            .assign(card.id, groceries, march(), Money::from_cents(100))
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::Budget(_)));
    }

    #[test]
    fn test_release_and_move() {
        let (_temp_dir, storage) = create_test_storage();
        let (account_id, groceries, fuel) = setup(&storage);
        let service = BudgetService::new(&storage);
        service.assign(account_id, groceries, march(), Money::from_cents(30000)).unwrap();

        let released = service
            .release(groceries, account_id, march(), Money::from_cents(5000))
            .unwrap();
        assert_eq!(released.allocated.cents(), -5000);

        let (outgoing, incoming) = service
            .move_funds(groceries, fuel, march(), Money::from_cents(10000))
            .unwrap();
        assert_eq!(outgoing.allocated.cents(), -10000);
        assert_eq!(incoming.allocated.cents(), 10000);

        let overview = service.month_overview(march()).unwrap();
        assert_eq!(overview.totals.allocated.cents(), 25000);
        assert_eq!(overview.ready_to_assign.cents(), 75000);

        let groceries_left = service.envelope_summary(groceries, march()).unwrap();
        assert_eq!(groceries_left.totals.remaining.cents(), 15000);

        let err = service
            .move_funds(groceries, fuel, march(), Money::from_cents(15001))
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::InsufficientFunds { .. }));

        assert!(service
            .move_funds(fuel, fuel, march(), Money::from_cents(1))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_shortfall_against_objective() {
        let (_temp_dir, storage) = create_test_storage();
        let (account_id, groceries, _) = setup(&storage);
        EnvelopeService::new(&storage)
            .set_objective(
                groceries,
                Some(Objective::new(Money::from_cents(40000), Cadence::Monthly)),
            )
            .unwrap();
        let service = BudgetService::new(&storage);
        service.assign(account_id, groceries, march(), Money::from_cents(25000)).unwrap();

        let summary = service.envelope_summary(groceries, march()).unwrap();
        assert_eq!(summary.requirement.cents(), 40000);
        assert_eq!(summary.shortfall.cents(), 15000);

        service.assign(account_id, groceries, march(), Money::from_cents(20000)).unwrap();
        let summary = service.envelope_summary(groceries, march()).unwrap();
        assert!(summary.shortfall.is_zero());
    }

    #[test]
    fn test_assign_compensates_when_allocation_insert_fails() {
        let (_temp_dir, storage) = create_test_storage();
        let (account_id, groceries, _) = setup(&storage);
        let failing = FailingAllocations::new(&storage.allocations);
        failing.fail_insert.set(true);
        let service = BudgetService::with_stores(with_allocations(&storage, &failing));

        let err = service
            .assign(account_id, groceries, march(), Money::from_cents(1000))
            .unwrap_err();
        match err {
            EnvelopeError::PartialUpdate { failures, .. } => assert_eq!(failures.len(), 1),
            other => panic!("unexpected error: {other}"),
        }

        let account = storage.stores().accounts.get(account_id).unwrap().unwrap();
        assert_eq!(account.ready_to_assign.cents(), 100000);
        assert!(storage.allocations.for_month(march()).unwrap().is_empty());
    }

    #[test]
    fn test_assign_compensates_when_account_fails() {
        let (_temp_dir, storage) = create_test_storage();
        let (account_id, groceries, _) = setup(&storage);
        let failing = FailingAccounts::new(&storage.accounts);
        let service = BudgetService::with_stores(with_accounts(&storage, &failing));

        let err = service
            .assign(account_id, groceries, march(), Money::from_cents(1000))
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::PartialUpdate { .. }));
        assert!(storage.allocations.for_month(march()).unwrap().is_empty());
        assert_eq!(
            storage.accounts.get(account_id).unwrap().unwrap().ready_to_assign.cents(),
            100000
        );
    }
}
