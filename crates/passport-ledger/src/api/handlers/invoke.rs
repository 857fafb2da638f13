//! Named Invocation Handler
//!
//! Accepts `{ "function": ..., "args": [...] }` with the same function names
//! and positional arguments ledger clients already use, including the legacy
//! chaincode names.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use passport_core::Invocation;

use crate::api::error::ApiError;
use crate::state::AppState;

/// Result of a named invocation
#[derive(Debug, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// Canonical name of the operation that ran
    pub function: String,

    /// True when the call went through the commit path
    pub submitted: bool,

    /// Operation output; `null` for delete
    pub result: serde_json::Value,
}

/// Run any contract operation by name
///
/// POST /v1/invoke
///
/// Read operations are evaluated against committed state. Mutating
/// operations are submitted and committed only on success.
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    Json(invocation): Json<Invocation>,
) -> Result<Json<InvokeResponse>, ApiError> {
    let operation = invocation.operation()?;
    let submitted = operation.is_mutating();

    let result = if submitted {
        state.submit(|c, tx| c.invoke(tx, &invocation))?
    } else {
        state.evaluate(|c, tx| c.evaluate(tx, &invocation))?
    };

    info!(
        function = %operation,
        submitted = submitted,
        signed = operation.is_signed(),
        "Invoked DPP operation"
    );

    Ok(Json(InvokeResponse {
        function: operation.name().to_string(),
        submitted,
        result: result.to_json()?,
    }))
}
