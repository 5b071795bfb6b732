// src/main.rs

use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use kokoro::chat::cache::spawn_sweeper;
use kokoro::config::CONFIG;
use kokoro::llm::GeminiClient;
use kokoro::store::sqlite::{run_migrations, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let level = Level::from_str(&CONFIG.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Kokoro backend");
    info!("Model: {}", CONFIG.gemini_model);
    if CONFIG.gemini_api_key.is_empty() {
        error!("GEMINI_API_KEY is not set; generation requests will fail");
    }

    // Create database pool and bootstrap the schema
    let pool = SqlitePoolOptions::new()
        .max_connections(CONFIG.sqlite_max_connections)
        .connect(&CONFIG.database_url)
        .await?;
    run_migrations(&pool).await?;

    let store = Arc::new(SqliteStore::new(pool));
    let llm = Arc::new(GeminiClient::from_config(&CONFIG));

    let app_state = kokoro::state::create_app_state(store, llm, CONFIG.session_ttl());

    // Purge idle chat sessions from the cache in the background
    let sweeper_handle = spawn_sweeper(app_state.cache.clone(), CONFIG.sweep_interval());
    info!(
        "Session cache sweeper started - running every {} seconds",
        CONFIG.cache_sweep_interval_secs
    );

    let app = Router::new().nest("/api", kokoro::api::router(app_state));

    // Start server
    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server listening on http://{}", bind_address);

    // Run server and cache sweeper concurrently
    tokio::select! {
        result = axum::serve(listener, app) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = sweeper_handle => {
            error!("Cache sweeper unexpectedly terminated");
        }
    }

    Ok(())
}
