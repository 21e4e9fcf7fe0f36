mod config;
mod dto;
mod handlers;
mod interceptors;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use config::{AppConfig, AppState, DatabaseConfig, StorageConfig};
use middleware::setup_logging;
use routes::create_router;
use services::{seed_service, RedisService, StorageService};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    tracing::info!("Starting application...");

    let app_config = AppConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    let storage_config = StorageConfig::from_env()?;

    tracing::info!("Loaded configuration for environment: {}", app_config.environment);

    let db_pool = db_config.create_pool().await?;
    tracing::info!("Database connection pool created");

    config::database::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations applied");

    let redis_service = RedisService::new().await?;
    tracing::info!("Redis service created");

    let storage_service = StorageService::new(&storage_config);

    let app_state = AppState::new(db_pool, redis_service, storage_service, app_config.clone());

    seed_service::run(&app_state.db).await?;
    tracing::info!("Seed data verified");

    let app = create_router(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    let addr = app_config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("{} is running on {}", app_config.app_name, addr);

    axum::serve(listener, app).await?;

    Ok(())
}
