//! Audit logging
//!
//! Every create, update and delete of a ledger record is appended to
//! `audit.log` as one JSON line with before/after snapshots.
//!
//! ```rust,ignore
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log_update(EntityType::Account, id.to_string(), Some(name), &before, &after, None)?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
