//! Envelope repository for JSON storage

use std::path::PathBuf;

use crate::error::EnvelopeResult;
use crate::models::{Envelope, EnvelopeId};

use super::collection::JsonCollection;
use super::EnvelopeStore;

pub struct EnvelopeRepository {
    records: JsonCollection<Envelope>,
}

impl EnvelopeRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            records: JsonCollection::new(path),
        }
    }

    pub fn load(&self) -> EnvelopeResult<()> {
        self.records.load()
    }
}

impl EnvelopeStore for EnvelopeRepository {
    fn get(&self, id: EnvelopeId) -> EnvelopeResult<Option<Envelope>> {
        self.records.get(id)
    }

    fn list(&self) -> EnvelopeResult<Vec<Envelope>> {
        self.records.all()
    }

    fn upsert(&self, envelope: Envelope) -> EnvelopeResult<()> {
        self.records.upsert(envelope)
    }
}
