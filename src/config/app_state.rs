use std::sync::Arc;
use sqlx::PgPool;
use crate::config::AppConfig;
use crate::services::{RedisService, StorageService};

/// Application state shared across all handlers and services
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Redis service (JWT deny-list)
    pub redis: RedisService,
    /// Object storage disks
    pub storage: Arc<StorageService>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: PgPool, redis: RedisService, storage: StorageService, config: AppConfig) -> Self {
        Self {
            db,
            redis,
            storage: Arc::new(storage),
            config: Arc::new(config),
        }
    }
}
