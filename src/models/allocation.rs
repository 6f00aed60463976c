//! Monthly allocation model
//!
//! Each allocation is one record for an (envelope, month) pair. Contributions
//! never edit an existing record: assigning, releasing or moving money always
//! inserts a fresh allocation. Spending is posted onto the latest record for
//! the pair. An envelope's state for a month is the sum of all its records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AllocationId, EnvelopeId};
use super::money::{Money, MoneyOverflow};
use super::month::Month;

/// A per-envelope, per-month allocation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAllocation {
    pub id: AllocationId,

    pub envelope_id: EnvelopeId,

    pub month: Month,

    /// Amount assigned by this record (negative when money was taken out)
    pub allocated: Money,

    /// Spending posted onto this record
    pub spent: Money,

    /// Always `allocated - spent`
    pub remaining: Money,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl MonthlyAllocation {
    /// An empty allocation, used to receive spending when none exists yet
    pub fn empty(envelope_id: EnvelopeId, month: Month) -> Self {
        Self::contribution(envelope_id, month, Money::zero())
    }

    /// A new allocation carrying a contribution of `amount`
    pub fn contribution(envelope_id: EnvelopeId, month: Month, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: AllocationId::new(),
            envelope_id,
            month,
            allocated: amount,
            spent: Money::zero(),
            remaining: amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add `delta` to spent; a negative delta reverses earlier spending
    pub fn adjust_spent(&mut self, delta: Money) -> Result<(), MoneyOverflow> {
        let spent = self.spent.checked_add(delta).ok_or(MoneyOverflow)?;
        let remaining = self.allocated.checked_sub(spent).ok_or(MoneyOverflow)?;
        self.spent = spent;
        self.remaining = remaining;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_consistent(&self) -> bool {
        self.remaining == self.allocated - self.spent
    }
}

impl fmt::Display for MonthlyAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} allocated: {} spent: {} remaining: {}",
            self.month, self.allocated, self.spent, self.remaining
        )
    }
}

/// Totals for one envelope over one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocationTotals {
    pub allocated: Money,
    pub spent: Money,
    pub remaining: Money,
}

impl AllocationTotals {
    pub fn of<'a>(allocations: impl IntoIterator<Item = &'a MonthlyAllocation>) -> Self {
        allocations
            .into_iter()
            .fold(Self::default(), |mut totals, allocation| {
                totals.allocated += allocation.allocated;
                totals.spent += allocation.spent;
                totals.remaining += allocation.remaining;
                totals
            })
    }

    pub fn is_overspent(&self) -> bool {
        self.remaining.is_negative()
    }
}

impl std::ops::Add for AllocationTotals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            allocated: self.allocated + other.allocated,
            spent: self.spent + other.spent,
            remaining: self.remaining + other.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> Month {
        Month::new(2025, 3).unwrap()
    }

    #[test]
    fn test_adjust_spent_keeps_remaining_in_sync() {
        let mut allocation =
            MonthlyAllocation::contribution(EnvelopeId::new(), march(), Money::from_cents(10000));
        allocation.adjust_spent(Money::from_cents(2500)).unwrap();
        assert_eq!(allocation.spent.cents(), 2500);
        assert_eq!(allocation.remaining.cents(), 7500);

        allocation.adjust_spent(Money::from_cents(-2500)).unwrap();
        assert!(allocation.spent.is_zero());
        assert_eq!(allocation.remaining.cents(), 10000);
        assert!(allocation.is_consistent());
    }

    #[test]
    fn test_empty_allocation_goes_negative_when_spent() {
        let mut allocation = MonthlyAllocation::empty(EnvelopeId::new(), march());
        allocation.adjust_spent(Money::from_cents(1200)).unwrap();
        assert_eq!(allocation.remaining.cents(), -1200);
    }

    #[test]
    fn test_adjust_spent_overflow_is_rejected() {
        let mut allocation =
            MonthlyAllocation::contribution(EnvelopeId::new(), march(), Money::from_cents(500));
        allocation.adjust_spent(Money::from_cents(100)).unwrap();

        assert_eq!(allocation.adjust_spent(Money::from_cents(i64::MAX)), Err(MoneyOverflow));
        assert_eq!(allocation.spent.cents(), 100);
        assert_eq!(allocation.remaining.cents(), 400);
    }

    #[test]
    fn test_totals_sum_every_record() {
        let envelope = EnvelopeId::new();
        let mut first = MonthlyAllocation::contribution(envelope, march(), Money::from_cents(5000));
        first.adjust_spent(Money::from_cents(7000)).unwrap();
        let second = MonthlyAllocation::contribution(envelope, march(), Money::from_cents(1000));

        let totals = AllocationTotals::of([&first, &second]);
        assert_eq!(totals.allocated.cents(), 6000);
        assert_eq!(totals.spent.cents(), 7000);
        assert_eq!(totals.remaining.cents(), -1000);
        assert!(totals.is_overspent());
    }
}
