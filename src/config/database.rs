use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Settings for the catalog datastore pool. Listing queries hold connections
/// only briefly, so the acquire timeout is kept short to surface a saturated
/// pool as an error instead of queued latency.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Ok(Self {
            url: cfg.get_string("DATABASE_URL")?,
            max_connections: cfg.get_int("DATABASE_MAX_CONNECTIONS").unwrap_or(10) as u32,
            acquire_timeout: Duration::from_secs(
                cfg.get_int("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(5) as u64,
            ),
        })
    }

    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.url)
            .await
    }
}

/// Apply the schema and seed migrations under ./migrations at startup.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
