//! Transaction repository for JSON storage

use std::path::PathBuf;

use crate::error::EnvelopeResult;
use crate::models::{AccountId, Transaction, TransactionId};

use super::collection::JsonCollection;
use super::TransactionStore;

pub struct TransactionRepository {
    records: JsonCollection<Transaction>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            records: JsonCollection::new(path),
        }
    }

    pub fn load(&self) -> EnvelopeResult<()> {
        self.records.load()
    }
}

impl TransactionStore for TransactionRepository {
    fn get(&self, id: TransactionId) -> EnvelopeResult<Option<Transaction>> {
        self.records.get(id)
    }

    fn list(&self) -> EnvelopeResult<Vec<Transaction>> {
        self.records.all()
    }

    fn by_account(&self, account_id: AccountId) -> EnvelopeResult<Vec<Transaction>> {
        self.records.filter(|t| t.account_id == account_id)
    }

    fn insert(&self, transaction: Transaction) -> EnvelopeResult<()> {
        self.records.upsert(transaction)
    }

    fn remove(&self, id: TransactionId) -> EnvelopeResult<bool> {
        self.records.remove(id)
    }
}
