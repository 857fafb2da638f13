//! Passport Ledger Server
//!
//! HTTP gateway hosting a Digital Product Passport ledger:
//! - Runs each request as one transaction against an in-memory world state
//! - Verifies signed create, update and transfer requests
//! - Optionally accepts unsigned mutations for trusted deployments
//! - Exposes every contract operation by name for existing ledger clients
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check with record count and unsigned mode
//! - `GET /v1/dpps` - List passports, optionally `?owner_did=`
//! - `POST /v1/dpps` - Signed create
//! - `GET /v1/dpps/{dpp_id}` - Read a passport
//! - `PUT /v1/dpps/{dpp_id}` - Signed update
//! - `DELETE /v1/dpps/{dpp_id}` - Delete (unsigned mode only)
//! - `GET /v1/dpps/{dpp_id}/exists` - Existence check
//! - `POST /v1/dpps/{dpp_id}/transfer` - Signed transfer
//! - `POST /v1/unsigned/dpps` - Unsigned create
//! - `PUT /v1/unsigned/dpps/{dpp_id}` - Unsigned update
//! - `POST /v1/unsigned/dpps/{dpp_id}/transfer` - Unsigned transfer
//! - `POST /v1/invoke` - Run a contract operation by name

pub mod api;
pub mod config;
pub mod state;

pub use api::create_router;
pub use api::error::ApiError;
pub use config::{ConfigError, LedgerConfig};
pub use state::AppState;
