//! Reelcache - movie records over HTTP, cache-aside in front of MongoDB.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB integration, the authoritative store
//! - `cache` - Ephemeral key-value cache (Redis or in-process Moka)
//! - `coordinator` - Cache-aside reads and write-through mutations
//! - `server` - HTTP routes (thin glue over the coordinator)

mod cache;
mod config;
mod coordinator;
mod database;
mod server;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use coordinator::AccessCoordinator;
use database::{Database, MovieRepository};
use server::AppState;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reelcache=info,tower_http=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting Reelcache...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    // Connect to MongoDB
    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    let store = Arc::new(MovieRepository::new(&db));
    info!("Database connected");

    let cache = cache::connect(&config.cache)?;
    let coordinator = AccessCoordinator::new(store, cache, &config.cache, config.listing_limit);

    let app = server::router(AppState::new(coordinator), &config.public_dir);
    server::serve(config.port, app).await
}
