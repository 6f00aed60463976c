//! Envelope model
//!
//! An envelope is a named budget category. It may carry an objective: an
//! amount to set aside per month, per year, or by a target date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::EnvelopeId;
use super::money::Money;
use super::month::Month;

/// How often an objective amount is due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cadence {
    Monthly,
    Yearly,
    ByDate(NaiveDate),
}

impl Cadence {
    /// Parse "monthly", "yearly" or a "YYYY-MM-DD" target date
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "mensuel" => Some(Self::Monthly),
            "yearly" | "annual" | "annuel" => Some(Self::Yearly),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .ok()
                .map(Self::ByDate),
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
            Self::ByDate(date) => write!(f, "by {}", date.format("%Y-%m-%d")),
        }
    }
}

/// A savings or spending objective for an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub amount: Money,
    pub cadence: Cadence,
}

impl Objective {
    pub fn new(amount: Money, cadence: Cadence) -> Self {
        Self { amount, cadence }
    }

    /// Amount that should be allocated during `month` to stay on track
    ///
    /// A by-date objective whose date has passed asks for the full amount.
    pub fn monthly_requirement(&self, month: Month) -> Money {
        match self.cadence {
            Cadence::Monthly => self.amount,
            Cadence::Yearly => self.amount.div_ceil(12),
            Cadence::ByDate(date) => {
                let months_left = month.months_through(Month::from_date(date)).max(1);
                self.amount.div_ceil(months_left)
            }
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.cadence)
    }
}

/// A budget envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: EnvelopeId,

    pub name: String,

    /// Free-text group used for display, e.g. "Bills"
    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub objective: Option<Objective>,

    #[serde(default)]
    pub archived: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Envelope {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EnvelopeId::new(),
            name: name.into(),
            group: group.into(),
            objective: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_objective(&mut self, objective: Option<Objective>) {
        self.objective = objective;
        self.updated_at = Utc::now();
    }

    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Utc::now();
    }

    pub fn unarchive(&mut self) {
        self.archived = false;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), EnvelopeValidationError> {
        if self.name.trim().is_empty() {
            return Err(EnvelopeValidationError::EmptyName);
        }
        if self.name.len() > 50 {
            return Err(EnvelopeValidationError::NameTooLong(self.name.len()));
        }
        if let Some(objective) = &self.objective {
            if !objective.amount.is_positive() {
                return Err(EnvelopeValidationError::NonPositiveObjective);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for envelopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeValidationError {
    EmptyName,
    NameTooLong(usize),
    NonPositiveObjective,
}

impl fmt::Display for EnvelopeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Envelope name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Envelope name too long ({} chars, max 50)", len)
            }
            Self::NonPositiveObjective => write!(f, "Objective amount must be positive"),
        }
    }
}

impl std::error::Error for EnvelopeValidationError {}
