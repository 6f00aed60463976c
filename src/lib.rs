//! Envelope ledger - envelope budgeting with balance propagation
//!
//! Money lives in accounts. A checking account's inflows feed its
//! ready-to-assign pool, which is handed out to envelopes month by month.
//! Every transaction posts to its account and, for expenses, to the
//! envelope allocations of its month.
//!
//! # Architecture
//!
//! - `models`: accounts, envelopes, allocations, transactions, money and months
//! - `ledger`: the effect table mapping a transaction to balance changes
//! - `storage`: JSON file stores behind per-collection traits
//! - `services`: business operations with two-leg posting and compensation
//! - `audit`: append-only JSONL audit trail
//! - `config`: data directory resolution and user settings
//! - `cli` / `display`: the `ledger` command line front end
//!
//! # Example
//!
//! ```rust,ignore
//! use envelope_ledger::config::{EnvelopePaths, Settings};
//! use envelope_ledger::storage::Storage;
//!
//! let paths = EnvelopePaths::new()?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{EnvelopeError, EnvelopeResult};
