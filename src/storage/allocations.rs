//! Monthly allocation repository for JSON storage
//!
//! Rows are append-only from the budget's point of view: contributions insert
//! new rows, and spending only ever adjusts `spent` on an existing row.

use std::path::PathBuf;

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{AllocationId, EnvelopeId, Money, Month, MonthlyAllocation};

use super::collection::JsonCollection;
use super::AllocationStore;

pub struct AllocationRepository {
    records: JsonCollection<MonthlyAllocation>,
}

impl AllocationRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            records: JsonCollection::new(path),
        }
    }

    pub fn load(&self) -> EnvelopeResult<()> {
        self.records.load()
    }
}

impl AllocationStore for AllocationRepository {
    fn get(&self, id: AllocationId) -> EnvelopeResult<Option<MonthlyAllocation>> {
        self.records.get(id)
    }

    fn for_envelope_month(
        &self,
        envelope_id: EnvelopeId,
        month: Month,
    ) -> EnvelopeResult<Vec<MonthlyAllocation>> {
        self.records
            .filter(|a| a.envelope_id == envelope_id && a.month == month)
    }

    fn for_month(&self, month: Month) -> EnvelopeResult<Vec<MonthlyAllocation>> {
        self.records.filter(|a| a.month == month)
    }

    fn insert(&self, allocation: MonthlyAllocation) -> EnvelopeResult<()> {
        self.records.upsert(allocation)
    }

    fn adjust_spent(&self, id: AllocationId, delta: Money) -> EnvelopeResult<MonthlyAllocation> {
        self.records
            .update(id, |allocation| Ok(allocation.adjust_spent(delta)?))?
            .ok_or_else(|| EnvelopeError::allocation_not_found(id.to_string()))
    }

    fn remove(&self, id: AllocationId) -> EnvelopeResult<bool> {
        self.records.remove(id)
    }
}
