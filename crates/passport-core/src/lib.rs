//! # Passport Core
//!
//! Contract logic for a ledger of Digital Product Passports (DPPs).
//!
//! ## Key Concepts
//!
//! - **DPP**: A product record keyed by `dpp_id`, owned by an identity string
//! - **Audit log**: Append-only history, one entry per committed mutation
//! - **Signed operation**: A mutation carrying an Ed25519 signature over the
//!   SHA-256 digest of a client message
//! - **Ledger store**: Transaction-scoped key/value world state supplied by
//!   the host
//!
//! ## Invariants
//!
//! 1. **Uniqueness**: At most one record per `dpp_id`
//! 2. **History**: Committed audit entries are never rewritten or removed
//! 3. **Ownership**: Signed update and transfer succeed only for the key that
//!    equals the current `owner_did`
//! 4. **Atomicity**: A failed operation leaves world state unchanged

pub mod audit;
pub mod auth;
pub mod bootstrap;
pub mod contract;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod operation;
pub mod query;
pub mod types;

pub use auth::AuthorizationError;
pub use contract::{ContractPolicy, DppContract};
pub use crypto::{AuthError, KeyPair, SignedEnvelope};
pub use error::{PassportError, Result};
pub use ledger::{LedgerStore, MemoryLedger, Selector, StoreError, Transaction};
pub use operation::{Invocation, InvocationResult, Operation};
pub use types::{AuditAction, AuditLogEntry, Dpp, DppFields, Permissions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}
