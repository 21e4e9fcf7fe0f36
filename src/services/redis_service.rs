use deadpool_redis::{Connection, Pool};
use deadpool_redis::redis::AsyncCommands;

use crate::config::RedisConfig;
use crate::interceptors::AppError;

/// Redis-backed revocation store. Token verification is stateless; only
/// invalidation needs a persisted record, keyed by the token's jti with a TTL
/// equal to the token's remaining lifetime.
#[derive(Clone)]
pub struct RedisService {
    pool: Pool,
}

fn denylist_key(jti: &str) -> String {
    format!("denylist:{}", jti)
}

impl RedisService {
    pub async fn new() -> Result<Self, AppError> {
        let config = RedisConfig::from_env()
            .map_err(|e| AppError::RedisError(format!("Failed to load Redis config: {}", e)))?;

        let pool = config.create_pool()
            .map_err(|e| AppError::RedisError(format!("Failed to create Redis pool: {}", e)))?;

        // Test connection
        let mut conn = pool.get().await
            .map_err(|e| AppError::RedisError(format!("Failed to get Redis connection: {}", e)))?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::RedisError(format!("Redis ping failed: {}", e)))?;

        tracing::info!("Redis service initialized successfully");

        Ok(Self { pool })
    }

    async fn get_connection(&self) -> Result<Connection, AppError> {
        self.pool.get().await
            .map_err(|e| AppError::RedisError(format!("Failed to get connection: {}", e)))
    }

    /// Mark a token as permanently unusable. The entry expires together with
    /// the token itself, so the deny-list never outgrows live tokens.
    pub async fn deny_token(&self, jti: &str, remaining_seconds: i64) -> Result<(), AppError> {
        if remaining_seconds <= 0 {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        conn.set_ex(denylist_key(jti), 1, remaining_seconds as u64)
            .await
            .map_err(|e| AppError::RedisError(e.to_string()))
    }

    pub async fn is_token_denied(&self, jti: &str) -> Result<bool, AppError> {
        let mut conn = self.get_connection().await?;
        conn.exists(denylist_key(jti))
            .await
            .map_err(|e| AppError::RedisError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denylist_keys_are_namespaced_by_jti() {
        assert_eq!(denylist_key("abc-123"), "denylist:abc-123");
    }
}
