//! Where the ledger keeps its files
//!
//! ```text
//! <base>/config.json        settings
//! <base>/audit.log          JSONL audit trail
//! <base>/data/*.json        one array per collection
//! ```
//!
//! `<base>` is `$ENVELOPE_LEDGER_DATA_DIR` when set and non-empty, otherwise
//! `envelope-ledger` under the platform config directory.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::error::EnvelopeError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "ENVELOPE_LEDGER_DATA_DIR";

const APP_DIR: &str = "envelope-ledger";

#[derive(Debug, Clone)]
pub struct EnvelopePaths {
    base_dir: PathBuf,
}

impl EnvelopePaths {
    /// Resolve the base directory
    ///
    /// # Errors
    ///
    /// Returns a config error if there is no override and no home directory.
    pub fn new() -> Result<Self, EnvelopeError> {
        if let Some(custom) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_base_dir(PathBuf::from(custom)));
        }

        let dirs = BaseDirs::new().ok_or_else(|| {
            EnvelopeError::Config(format!(
                "Could not determine a home directory; set {} instead",
                DATA_DIR_ENV
            ))
        })?;
        Ok(Self::with_base_dir(dirs.config_dir().join(APP_DIR)))
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    fn collection(&self, name: &str) -> PathBuf {
        self.data_dir().join(format!("{}.json", name))
    }

    pub fn accounts_file(&self) -> PathBuf {
        self.collection("accounts")
    }

    pub fn envelopes_file(&self) -> PathBuf {
        self.collection("envelopes")
    }

    pub fn allocations_file(&self) -> PathBuf {
        self.collection("allocations")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.collection("transactions")
    }

    /// Create the base and data directories if needed
    pub fn ensure_directories(&self) -> Result<(), EnvelopeError> {
        let data_dir = self.data_dir();
        std::fs::create_dir_all(&data_dir).map_err(|e| {
            EnvelopeError::Io(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })
    }

    /// `init` has written the settings file
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
