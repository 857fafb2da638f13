//! Passport Ledger Server Binary
//!
//! Runs the HTTP gateway over an in-memory passport ledger.

use std::error::Error;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use passport_core::bootstrap;
use passport_ledger::{create_router, AppState, LedgerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Configuration
    let config = LedgerConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if config.allow_unsigned {
        warn!("SECURITY: unsigned create, update, transfer and delete are enabled");
    }

    info!(
        name = ?config.ledger_name,
        port = config.port,
        allow_unsigned = config.allow_unsigned,
        "Starting passport ledger"
    );

    // Create application state
    let state = Arc::new(AppState::new(config.clone()));

    // Seed world state
    if let Some(path) = &config.seed_file {
        let records = bootstrap::load_seed(path)?;
        let written = state.seed(&records)?;
        info!(path = %path.display(), records = written, "Loaded seed file");
    }

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(addr = %addr, "Passport ledger listening");

    axum::serve(listener, app).await?;
    Ok(())
}
