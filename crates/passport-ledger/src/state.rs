//! Shared gateway state
//!
//! The gateway owns one in-memory ledger behind a mutex. Holding the lock for
//! the whole call orders transactions: each call opens a transaction stamped
//! with a single timestamp, runs one contract method, then commits on success
//! and rolls back on failure.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, error};

use passport_core::{
    bootstrap, ContractPolicy, Dpp, DppContract, MemoryLedger, Result as PassportResult,
    Transaction,
};

use crate::api::error::ApiError;
use crate::config::LedgerConfig;

/// Application state shared across handlers
pub struct AppState {
    ledger: Mutex<MemoryLedger>,
    contract: DppContract,
    /// Gateway configuration
    pub config: LedgerConfig,
}

impl AppState {
    /// Empty ledger with the contract policy taken from `config`
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_ledger(config, MemoryLedger::new())
    }

    pub fn with_ledger(config: LedgerConfig, ledger: MemoryLedger) -> Self {
        let policy = ContractPolicy {
            allow_unsigned: config.allow_unsigned,
        };
        Self {
            ledger: Mutex::new(ledger),
            contract: DppContract::new(policy),
            config,
        }
    }

    pub fn contract(&self) -> &DppContract {
        &self.contract
    }

    /// Run a mutating call; its writes are committed only if it succeeds
    pub fn submit<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: FnOnce(&DppContract, &mut Transaction<'_>) -> PassportResult<T>,
    {
        let mut ledger = self.lock()?;
        let mut tx = ledger.begin(Utc::now());

        match call(&self.contract, &mut tx) {
            Ok(value) => {
                tx.commit();
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "Transaction rejected");
                tx.rollback();
                Err(err.into())
            }
        }
    }

    /// Run a read-only call against committed state
    pub fn evaluate<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: FnOnce(&DppContract, &Transaction<'_>) -> PassportResult<T>,
    {
        let mut ledger = self.lock()?;
        let tx = ledger.begin(Utc::now());
        let result = call(&self.contract, &tx);
        tx.rollback();
        result.map_err(ApiError::from)
    }

    /// Write seed records in one transaction
    pub fn seed(&self, records: &[Dpp]) -> Result<usize, ApiError> {
        self.submit(|_, tx| bootstrap::init_ledger(tx, records))
    }

    /// Number of committed records
    pub fn record_count(&self) -> Result<usize, ApiError> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryLedger>, ApiError> {
        self.ledger.lock().map_err(|_| {
            error!("Ledger lock poisoned");
            ApiError::Internal("ledger unavailable".into())
        })
    }
}
