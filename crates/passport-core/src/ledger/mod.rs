//! World-state capability consumed by the contract
//!
//! The contract never owns storage. Every operation receives a
//! [`LedgerStore`] scoped to the current transaction and goes through its
//! narrow interface: point reads and writes, range scans, selector queries
//! and the transaction clock. Durability, ordering of concurrent
//! transactions and atomic commit belong to whoever implements it.

pub mod memory;

pub use memory::{MemoryLedger, Transaction};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Error type for world-state access
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("read failed: {0}")]
    Read(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("transaction timestamp unavailable: {0}")]
    Timestamp(String),
}

/// A key and its stored bytes, as yielded by scans and queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// Single-pass result iterator returned by scans and queries
pub type StateIter<'a> = Box<dyn Iterator<Item = Result<KeyValue, StoreError>> + 'a>;

/// Structured equality predicate for rich queries
///
/// Renders to the `{"selector": {...}}` document understood by JSON
/// document stores. Values are serialized, never spliced into query text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selector {
    selector: BTreeMap<String, Value>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.selector.insert(field.into(), value.into());
        self
    }

    /// Query document for stores that accept JSON selectors
    pub fn to_query_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// True when every constraint holds for a JSON document
    pub fn matches(&self, document: &Value) -> bool {
        self.selector
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

/// Transaction-scoped view of the ledger world state
pub trait LedgerStore {
    /// Read the committed value for `key`
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stage a write of `value` under `key`
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Stage removal of `key`
    fn del_state(&mut self, key: &str) -> Result<(), StoreError>;

    /// Scan keys in `[start, end)`; an empty bound is open on that side
    fn state_by_range(&self, start: &str, end: &str) -> Result<StateIter<'_>, StoreError>;

    /// Rich query over stored JSON documents
    fn query(&self, selector: &Selector) -> Result<StateIter<'_>, StoreError>;

    /// Deterministic time of the current transaction
    fn tx_timestamp(&self) -> Result<DateTime<Utc>, StoreError>;
}
