//! Pure bookkeeping rules
//!
//! Translates a transaction into the balance changes it causes, with no
//! storage involved. Registering applies `LedgerEffects::of`, deleting
//! applies its `reversed()`.

mod effects;

pub use effects::{allocation_effects, AccountEffect, AllocationEffect, LedgerEffects};
