//! Envelope service

use chrono::Utc;
use tracing::info;

use crate::audit::EntityType;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{Envelope, EnvelopeId, Objective};
use crate::storage::{Storage, Stores};

/// Group used when none is given
pub const DEFAULT_GROUP: &str = "General";

pub struct EnvelopeService<'a> {
    stores: Stores<'a>,
}

impl<'a> EnvelopeService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_stores(storage.stores())
    }

    pub fn with_stores(stores: Stores<'a>) -> Self {
        Self { stores }
    }

    pub fn create(
        &self,
        name: &str,
        group: Option<&str>,
        objective: Option<Objective>,
    ) -> EnvelopeResult<Envelope> {
        let name = name.trim();
        if self.name_taken(name, None)? {
            return Err(EnvelopeError::Duplicate {
                entity_type: "Envelope",
                identifier: name.to_string(),
            });
        }

        let group = group
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(DEFAULT_GROUP);

        let mut envelope = Envelope::new(name, group);
        envelope.objective = objective;
        envelope
            .validate()
            .map_err(|e| EnvelopeError::Validation(e.to_string()))?;

        self.stores.envelopes.upsert(envelope.clone())?;

        self.stores.audit.log_create(
            EntityType::Envelope,
            envelope.id.to_string(),
            Some(envelope.name.clone()),
            &envelope,
        )?;

        info!(envelope = %envelope.id, name = %envelope.name, "envelope created");
        Ok(envelope)
    }

    pub fn get(&self, id: EnvelopeId) -> EnvelopeResult<Option<Envelope>> {
        self.stores.envelopes.get(id)
    }

    /// Find an envelope by name (case-insensitive) or id
    pub fn find(&self, identifier: &str) -> EnvelopeResult<Option<Envelope>> {
        let envelopes = self.stores.envelopes.list()?;
        let lowered = identifier.trim().to_lowercase();

        if let Some(envelope) = envelopes.iter().find(|e| e.name.to_lowercase() == lowered) {
            return Ok(Some(envelope.clone()));
        }

        if let Ok(id) = identifier.parse::<EnvelopeId>() {
            return self.stores.envelopes.get(id);
        }

        Ok(envelopes.into_iter().find(|e| e.id.matches_short(identifier)))
    }

    pub fn resolve(&self, identifier: &str) -> EnvelopeResult<Envelope> {
        self.find(identifier)?
            .ok_or_else(|| EnvelopeError::envelope_not_found(identifier))
    }

    pub fn list(&self, include_archived: bool) -> EnvelopeResult<Vec<Envelope>> {
        let mut envelopes = self.stores.envelopes.list()?;
        if !include_archived {
            envelopes.retain(|e| !e.archived);
        }
        Ok(envelopes)
    }

    pub fn rename(&self, id: EnvelopeId, new_name: &str) -> EnvelopeResult<Envelope> {
        let new_name = new_name.trim();
        if self.name_taken(new_name, Some(id))? {
            return Err(EnvelopeError::Duplicate {
                entity_type: "Envelope",
                identifier: new_name.to_string(),
            });
        }
        self.update(id, |envelope| envelope.name = new_name.to_string())
    }

    /// Move an envelope to another group
    pub fn regroup(&self, id: EnvelopeId, group: &str) -> EnvelopeResult<Envelope> {
        let group = group.trim();
        if group.is_empty() {
            return Err(EnvelopeError::Validation("Group cannot be empty".into()));
        }
        self.update(id, |envelope| envelope.group = group.to_string())
    }

    /// Set or clear (`None`) the funding objective
    pub fn set_objective(
        &self,
        id: EnvelopeId,
        objective: Option<Objective>,
    ) -> EnvelopeResult<Envelope> {
        self.update(id, |envelope| envelope.set_objective(objective))
    }

    pub fn archive(&self, id: EnvelopeId) -> EnvelopeResult<Envelope> {
        let envelope = self.require(id)?;
        if envelope.archived {
            return Err(EnvelopeError::Validation(format!(
                "Envelope '{}' is already archived",
                envelope.name
            )));
        }
        self.update(id, Envelope::archive)
    }

    pub fn unarchive(&self, id: EnvelopeId) -> EnvelopeResult<Envelope> {
        let envelope = self.require(id)?;
        if !envelope.archived {
            return Err(EnvelopeError::Validation(format!(
                "Envelope '{}' is not archived",
                envelope.name
            )));
        }
        self.update(id, Envelope::unarchive)
    }

    fn require(&self, id: EnvelopeId) -> EnvelopeResult<Envelope> {
        self.stores
            .envelopes
            .get(id)?
            .ok_or_else(|| EnvelopeError::envelope_not_found(id.to_string()))
    }

    fn name_taken(&self, name: &str, exclude: Option<EnvelopeId>) -> EnvelopeResult<bool> {
        let lowered = name.to_lowercase();
        Ok(self
            .stores
            .envelopes
            .list()?
            .iter()
            .any(|e| Some(e.id) != exclude && e.name.to_lowercase() == lowered))
    }

    fn update(
        &self,
        id: EnvelopeId,
        change: impl FnOnce(&mut Envelope),
    ) -> EnvelopeResult<Envelope> {
        let mut envelope = self.require(id)?;
        let before = envelope.clone();

        change(&mut envelope);
        envelope.updated_at = Utc::now();
        envelope
            .validate()
            .map_err(|e| EnvelopeError::Validation(e.to_string()))?;

        self.stores.envelopes.upsert(envelope.clone())?;

        self.stores.audit.log_update(
            EntityType::Envelope,
            envelope.id.to_string(),
            Some(envelope.name.clone()),
            &before,
            &envelope,
            None,
        )?;

        Ok(envelope)
    }
}
