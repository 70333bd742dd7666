//! HTTP interface for the coach client portal.
//!
//! Serves the JSON API for catalog management, program composition and the
//! active program flow, plus a server-sent event feed of the routine library.

mod auth;
mod config;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use database::Database;
use portal::{LocalBlobStore, Portal};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, tokens = config.tokens.len(), "Starting portal web server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Photo storage, served back under /blobs
    tokio::fs::create_dir_all(&config.blob_dir).await?;
    let blobs = LocalBlobStore::new(&config.blob_dir, &config.blob_base_url);

    // Build application state
    let portal = Portal::new(db.clone(), Arc::new(blobs));
    let state = AppState::new(db, portal, Arc::new(config.tokens.clone()));

    // Build router
    let app = routes::router()
        .nest_service("/blobs", ServeDir::new(&config.blob_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    info!(addr = %config.addr, "Portal web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
