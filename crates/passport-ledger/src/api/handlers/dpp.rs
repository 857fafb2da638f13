//! Passport Handlers
//!
//! Reads, signed mutations and their unsigned counterparts. Each handler
//! maps to exactly one contract operation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use passport_core::{Dpp, DppFields, SignedEnvelope};

use crate::api::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Optional owner filter for listing
#[derive(Debug, Default, Deserialize)]
pub struct ListDppsQuery {
    pub owner_did: Option<String>,
}

/// Listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct ListDppsResponse {
    pub dpps: Vec<Dpp>,
    pub count: usize,
}

/// Existence check response
#[derive(Debug, Serialize, Deserialize)]
pub struct ExistsResponse {
    pub dpp_id: String,
    pub exists: bool,
}

/// Signed create; the id is generated when absent
#[derive(Debug, Deserialize)]
pub struct CreateDppRequest {
    #[serde(default)]
    pub dpp_id: Option<String>,

    #[serde(flatten)]
    pub fields: DppFields,

    #[serde(flatten)]
    pub signature: SignedEnvelope,
}

/// Signed full replacement of the mutable fields
#[derive(Debug, Deserialize)]
pub struct UpdateDppRequest {
    #[serde(flatten)]
    pub fields: DppFields,

    #[serde(flatten)]
    pub signature: SignedEnvelope,
}

/// Signed ownership transfer
#[derive(Debug, Deserialize)]
pub struct TransferDppRequest {
    pub new_owner_did: String,

    #[serde(flatten)]
    pub signature: SignedEnvelope,
}

/// Unsigned create
#[derive(Debug, Deserialize)]
pub struct UnsignedCreateRequest {
    #[serde(default)]
    pub dpp_id: Option<String>,

    #[serde(flatten)]
    pub fields: DppFields,
}

/// Unsigned transfer
#[derive(Debug, Deserialize)]
pub struct UnsignedTransferRequest {
    pub new_owner_did: String,
}

/// Delete acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteDppResponse {
    pub dpp_id: String,
    pub deleted: bool,
}

/// Use the client id or assign a fresh UUIDv4
fn assign_id(dpp_id: Option<String>) -> String {
    dpp_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

// =============================================================================
// Reads
// =============================================================================

/// List every passport, or only those owned by `owner_did`
///
/// GET /v1/dpps
pub async fn list_dpps(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListDppsQuery>,
) -> Result<Json<ListDppsResponse>, ApiError> {
    let dpps = match query.owner_did {
        Some(owner_did) => state.evaluate(|c, tx| c.list_by_owner(tx, &owner_did))?,
        None => state.evaluate(|c, tx| c.list_all(tx))?,
    };
    let count = dpps.len();

    Ok(Json(ListDppsResponse { dpps, count }))
}

/// Read one passport
///
/// GET /v1/dpps/{dpp_id}
pub async fn read_dpp(
    State(state): State<Arc<AppState>>,
    Path(dpp_id): Path<String>,
) -> Result<Json<Dpp>, ApiError> {
    let dpp = state.evaluate(|c, tx| c.read(tx, &dpp_id))?;
    Ok(Json(dpp))
}

/// GET /v1/dpps/{dpp_id}/exists
pub async fn dpp_exists(
    State(state): State<Arc<AppState>>,
    Path(dpp_id): Path<String>,
) -> Result<Json<ExistsResponse>, ApiError> {
    let exists = state.evaluate(|c, tx| c.exists(tx, &dpp_id))?;
    Ok(Json(ExistsResponse { dpp_id, exists }))
}

// =============================================================================
// Signed mutations
// =============================================================================

/// Create a passport with a signature over the client message
///
/// POST /v1/dpps
pub async fn create_dpp(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDppRequest>,
) -> Result<(StatusCode, Json<Dpp>), ApiError> {
    let dpp_id = assign_id(request.dpp_id);

    let dpp = state.submit(|c, tx| {
        c.create_with_signature(tx, &dpp_id, request.fields, &request.signature)
    })?;

    info!(dpp_id = %dpp.dpp_id, signer = %request.signature.signer(), "Created DPP");
    Ok((StatusCode::CREATED, Json(dpp)))
}

/// Replace a passport's fields on behalf of its owner
///
/// PUT /v1/dpps/{dpp_id}
pub async fn update_dpp(
    State(state): State<Arc<AppState>>,
    Path(dpp_id): Path<String>,
    Json(request): Json<UpdateDppRequest>,
) -> Result<Json<Dpp>, ApiError> {
    let dpp = state.submit(|c, tx| {
        c.update_with_signature(tx, &dpp_id, request.fields, &request.signature)
    })?;
    Ok(Json(dpp))
}

/// Transfer a passport on behalf of its owner
///
/// POST /v1/dpps/{dpp_id}/transfer
pub async fn transfer_dpp(
    State(state): State<Arc<AppState>>,
    Path(dpp_id): Path<String>,
    Json(request): Json<TransferDppRequest>,
) -> Result<Json<Dpp>, ApiError> {
    let dpp = state.submit(|c, tx| {
        c.transfer_with_signature(tx, &dpp_id, &request.new_owner_did, &request.signature)
    })?;

    info!(
        dpp_id = %dpp_id,
        new_owner = %request.new_owner_did,
        "Transferred DPP"
    );
    Ok(Json(dpp))
}

// =============================================================================
// Unsigned mutations
// =============================================================================

/// DELETE /v1/dpps/{dpp_id}
pub async fn delete_dpp(
    State(state): State<Arc<AppState>>,
    Path(dpp_id): Path<String>,
) -> Result<Json<DeleteDppResponse>, ApiError> {
    state.submit(|c, tx| c.delete(tx, &dpp_id))?;
    Ok(Json(DeleteDppResponse {
        dpp_id,
        deleted: true,
    }))
}

/// POST /v1/unsigned/dpps
pub async fn create_dpp_unsigned(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UnsignedCreateRequest>,
) -> Result<(StatusCode, Json<Dpp>), ApiError> {
    let dpp_id = assign_id(request.dpp_id);
    let dpp = state.submit(|c, tx| c.create(tx, &dpp_id, request.fields))?;
    Ok((StatusCode::CREATED, Json(dpp)))
}

/// PUT /v1/unsigned/dpps/{dpp_id}
pub async fn update_dpp_unsigned(
    State(state): State<Arc<AppState>>,
    Path(dpp_id): Path<String>,
    Json(fields): Json<DppFields>,
) -> Result<Json<Dpp>, ApiError> {
    let dpp = state.submit(|c, tx| c.update(tx, &dpp_id, fields))?;
    Ok(Json(dpp))
}

/// POST /v1/unsigned/dpps/{dpp_id}/transfer
pub async fn transfer_dpp_unsigned(
    State(state): State<Arc<AppState>>,
    Path(dpp_id): Path<String>,
    Json(request): Json<UnsignedTransferRequest>,
) -> Result<Json<Dpp>, ApiError> {
    let dpp = state.submit(|c, tx| c.transfer(tx, &dpp_id, &request.new_owner_did))?;
    Ok(Json(dpp))
}
