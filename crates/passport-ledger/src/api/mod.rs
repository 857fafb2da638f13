//! API module for the ledger gateway

pub mod error;
pub mod handlers;

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use error::ApiError;

/// Health check response
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response
#[derive(Serialize, Deserialize)]
pub struct ReadyResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_name: Option<String>,
    pub record_count: usize,
    pub allow_unsigned: bool,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Readiness check endpoint
///
/// GET /ready
pub async fn ready(State(state): State<Arc<AppState>>) -> Result<Json<ReadyResponse>, ApiError> {
    Ok(Json(ReadyResponse {
        ready: true,
        ledger_name: state.config.ledger_name.clone(),
        record_count: state.record_count()?,
        allow_unsigned: state.contract().policy().allow_unsigned,
    }))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Browser wallets sign client-side and call the gateway directly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Passport endpoints
        .route(
            "/v1/dpps",
            get(handlers::list_dpps).post(handlers::create_dpp),
        )
        .route(
            "/v1/dpps/{dpp_id}",
            get(handlers::read_dpp)
                .put(handlers::update_dpp)
                .delete(handlers::delete_dpp),
        )
        .route("/v1/dpps/{dpp_id}/exists", get(handlers::dpp_exists))
        .route("/v1/dpps/{dpp_id}/transfer", post(handlers::transfer_dpp))
        // Unsigned endpoints, refused unless the ledger allows them
        .route("/v1/unsigned/dpps", post(handlers::create_dpp_unsigned))
        .route(
            "/v1/unsigned/dpps/{dpp_id}",
            put(handlers::update_dpp_unsigned),
        )
        .route(
            "/v1/unsigned/dpps/{dpp_id}/transfer",
            post(handlers::transfer_dpp_unsigned),
        )
        // Named invocation
        .route("/v1/invoke", post(handlers::invoke))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
