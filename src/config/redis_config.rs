use deadpool_redis::{Config, Pool, Runtime};
use redis::RedisError;

/// Connection settings for the token revocation store. The deny-list is the
/// only Redis consumer in this service, so a small pool suffices.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub pool_size: usize,
}

impl RedisConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        Ok(Self {
            url: cfg
                .get_string("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            pool_size: cfg.get_int("REDIS_POOL_SIZE").unwrap_or(4) as usize,
        })
    }

    pub fn create_pool(&self) -> Result<Pool, RedisError> {
        let cfg = Config {
            url: Some(self.url.clone()),
            connection: None,
            pool: Some(deadpool_redis::PoolConfig {
                max_size: self.pool_size,
                ..Default::default()
            }),
            ..Default::default()
        };

        cfg.create_pool(Some(Runtime::Tokio1)).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::IoError,
                "Failed to create pool",
                e.to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_creation_is_lazy_and_accepts_a_valid_url() {
        let config = RedisConfig {
            url: "redis://localhost:6379".to_string(),
            pool_size: 2,
        };
        // Connections are only established on first use.
        assert!(config.create_pool().is_ok());
    }
}
