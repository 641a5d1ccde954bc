//! # rollcall-server
//!
//! HTTP server for the rollcall event-attendance system.
//!
//! This binary provides:
//! - REST API for event management and geolocated check-in
//! - OpenAPI documentation via Swagger UI
//! - Structured logging to file and stdout
//!
//! ## Running
//!
//! ```bash
//! # Development
//! cargo run --package rollcall-server
//!
//! # Production
//! ROLLCALL_ENV=production ./rollcall-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use rollcall_core::{EventStore, InMemoryEventStore, RollcallConfig};
use rollcall_server::{api, logging, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production =
        std::env::var("ROLLCALL_ENV").is_ok_and(|env| env.eq_ignore_ascii_case("production"));

    // Initialize logging
    logging::init(is_production)?;

    info!("Starting rollcall-server");

    // Load configuration and apply environment overrides
    let mut config = RollcallConfig::load_or_default(&RollcallConfig::default_path())?;
    config.apply_env();

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // The store is constructed here, once, and handed to the state - never
    // reached through ambient globals.
    let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
    let state = AppState::shared(config, store);

    // Build the application router
    let app = api::create_router(state);

    let listener = TcpListener::bind(addr).await?;

    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
