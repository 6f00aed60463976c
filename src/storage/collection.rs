//! In-memory record collection backed by a JSON file
//!
//! Records live in a `RwLock<HashMap>` and every mutation rewrites the file
//! atomically, so each call is durable on its own.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{
    Account, AccountId, AllocationId, Envelope, EnvelopeId, MonthlyAllocation, Transaction,
    TransactionId,
};

use super::file_io::{read_json, write_json_atomic};

/// A record with a stable key
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: Copy + Eq + Hash;

    fn id(&self) -> Self::Id;

    /// Order used when writing the file and listing records
    fn order(a: &Self, b: &Self) -> Ordering;
}

impl Record for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        a.name.to_lowercase().cmp(&b.name.to_lowercase())
    }
}

impl Record for Envelope {
    type Id = EnvelopeId;

    fn id(&self) -> EnvelopeId {
        self.id
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        a.group
            .to_lowercase()
            .cmp(&b.group.to_lowercase())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    }
}

impl Record for MonthlyAllocation {
    type Id = AllocationId;

    fn id(&self) -> AllocationId {
        self.id
    }

    /// Same-instant rows fall back to id so the order never depends on the map
    fn order(a: &Self, b: &Self) -> Ordering {
        a.month
            .cmp(&b.month)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}

impl Record for Transaction {
    type Id = TransactionId;

    fn id(&self) -> TransactionId {
        self.id
    }

    /// Newest first
    fn order(a: &Self, b: &Self) -> Ordering {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    }
}

/// A keyed set of records persisted as a JSON array
pub struct JsonCollection<R: Record> {
    path: PathBuf,
    records: RwLock<HashMap<R::Id, R>>,
}

impl<R: Record> JsonCollection<R> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            records: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> EnvelopeResult<RwLockReadGuard<'_, HashMap<R::Id, R>>> {
        self.records
            .read()
            .map_err(|e| EnvelopeError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> EnvelopeResult<RwLockWriteGuard<'_, HashMap<R::Id, R>>> {
        self.records
            .write()
            .map_err(|e| EnvelopeError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Replace the in-memory records with the file contents
    pub fn load(&self) -> EnvelopeResult<()> {
        let file_records: Vec<R> = read_json(&self.path)?;
        let mut records = self.write()?;
        records.clear();
        records.extend(file_records.into_iter().map(|r| (r.id(), r)));
        Ok(())
    }

    pub fn save(&self) -> EnvelopeResult<()> {
        let sorted = self.all()?;
        write_json_atomic(&self.path, &sorted)
    }

    pub fn get(&self, id: R::Id) -> EnvelopeResult<Option<R>> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All records in `Record::order`
    pub fn all(&self) -> EnvelopeResult<Vec<R>> {
        let mut records: Vec<R> = self.read()?.values().cloned().collect();
        records.sort_by(R::order);
        Ok(records)
    }

    /// Records matching `predicate`, in `Record::order`
    pub fn filter(&self, predicate: impl Fn(&R) -> bool) -> EnvelopeResult<Vec<R>> {
        let mut records: Vec<R> = self
            .read()?
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        records.sort_by(R::order);
        Ok(records)
    }

    /// Insert or replace a record and persist
    pub fn upsert(&self, record: R) -> EnvelopeResult<()> {
        self.write()?.insert(record.id(), record);
        self.save()
    }

    /// Mutate an existing record in place and persist, returning the new state
    ///
    /// A failing `change` must leave the record as it was; nothing is saved.
    pub fn update(
        &self,
        id: R::Id,
        change: impl FnOnce(&mut R) -> EnvelopeResult<()>,
    ) -> EnvelopeResult<Option<R>> {
        let updated = {
            let mut records = self.write()?;
            match records.get_mut(&id) {
                Some(record) => {
                    change(record)?;
                    record.clone()
                }
                None => return Ok(None),
            }
        };
        self.save()?;
        Ok(Some(updated))
    }

    /// Remove a record and persist; returns whether it existed
    pub fn remove(&self, id: R::Id) -> EnvelopeResult<bool> {
        let removed = self.write()?.remove(&id).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn len(&self) -> EnvelopeResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> EnvelopeResult<bool> {
        Ok(self.read()?.is_empty())
    }
}
