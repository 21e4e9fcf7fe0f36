pub mod app_config;
pub mod app_state;
pub mod database;
pub mod redis_config;
pub mod storage_config;

pub use app_config::AppConfig;
pub use app_state::AppState;
pub use database::DatabaseConfig;
pub use redis_config::RedisConfig;
pub use storage_config::StorageConfig;
