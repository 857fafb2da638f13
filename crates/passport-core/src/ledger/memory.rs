//! In-memory ledger backend
//!
//! Keeps committed world state in a key-ordered map and runs each
//! invocation in a [`Transaction`]: reads see committed state only, writes
//! are buffered and land together on [`Transaction::commit`]. Dropping a
//! transaction without committing discards its writes.
//! Intended for tests and single-node use. Data is lost on restart.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::debug;

use super::{KeyValue, LedgerStore, Selector, StateIter, StoreError};

/// Committed world state
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    state: BTreeMap<String, Vec<u8>>,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction whose clock reads `timestamp`
    pub fn begin(&mut self, timestamp: DateTime<Utc>) -> Transaction<'_> {
        Transaction {
            ledger: self,
            timestamp,
            writes: BTreeMap::new(),
        }
    }

    /// Committed value for `key`
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.state.get(key).map(Vec::as_slice)
    }

    /// Number of committed keys
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

/// One transaction against a [`MemoryLedger`]
#[derive(Debug)]
pub struct Transaction<'a> {
    ledger: &'a mut MemoryLedger,
    timestamp: DateTime<Utc>,
    /// Staged writes; `None` marks a delete
    writes: BTreeMap<String, Option<Vec<u8>>>,
}

impl Transaction<'_> {
    /// Number of staged writes and deletes
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Apply every staged write to the ledger
    pub fn commit(self) -> usize {
        let count = self.writes.len();
        for (key, value) in self.writes {
            match value {
                Some(bytes) => {
                    self.ledger.state.insert(key, bytes);
                }
                None => {
                    self.ledger.state.remove(&key);
                }
            }
        }
        debug!(writes = count, timestamp = %self.timestamp, "Committed transaction");
        count
    }

    /// Discard staged writes
    pub fn rollback(self) {
        debug!(discarded = self.writes.len(), "Rolled back transaction");
    }
}

impl LedgerStore for Transaction<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.ledger.state.get(key).cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::Write("key must not be empty".into()));
        }
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::Write("key must not be empty".into()));
        }
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn state_by_range(&self, start: &str, end: &str) -> Result<StateIter<'_>, StoreError> {
        if !start.is_empty() && !end.is_empty() && start > end {
            return Err(StoreError::Query(format!(
                "range start '{}' is after end '{}'",
                start, end
            )));
        }

        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start.to_string())
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end.to_string())
        };

        let iter = self
            .ledger
            .state
            .range::<String, _>((lower, upper))
            .map(|(key, value)| {
                Ok(KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                })
            });
        Ok(Box::new(iter))
    }

    fn query(&self, selector: &Selector) -> Result<StateIter<'_>, StoreError> {
        let selector = selector.clone();
        let iter = self.ledger.state.iter().filter_map(move |(key, value)| {
            // Values that are not JSON documents never match a selector
            let document: Value = serde_json::from_slice(value).ok()?;
            selector.matches(&document).then(|| {
                Ok(KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                })
            })
        });
        Ok(Box::new(iter))
    }

    fn tx_timestamp(&self) -> Result<DateTime<Utc>, StoreError> {
        Ok(self.timestamp)
    }
}
