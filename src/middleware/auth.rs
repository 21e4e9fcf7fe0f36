use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    http::header,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppState;
use crate::interceptors::AppError;
use crate::models::{role::ROLE_ADMIN, User};
use crate::services::role_service;

/// JWT claims: identity only, no custom payload.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, email: String, expiration_seconds: i64) -> Self {
        let iat = Utc::now();
        let exp = iat + Duration::seconds(expiration_seconds);

        Self {
            sub: user_id,
            email,
            jti: Uuid::new_v4().to_string(),
            iat: iat.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Claims with the expiration configured via JWT_EXPIRATION (seconds).
    pub fn with_env_expiration(user_id: i64, email: String) -> Self {
        let expiration_seconds = std::env::var("JWT_EXPIRATION")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<i64>()
            .unwrap_or(3600);

        Self::new(user_id, email, expiration_seconds)
    }

    /// Seconds until natural expiry, clamped at zero.
    pub fn remaining_seconds(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }

    pub fn lifetime_seconds(&self) -> i64 {
        self.exp - self.iat
    }
}

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::InternalError("JWT_SECRET not found in environment".to_string()))?;

        if secret.is_empty() {
            return Err(AppError::InternalError("JWT_SECRET cannot be empty".to_string()));
        }

        Ok(Self { secret })
    }
}

/// Generate a signed bearer token from claims
pub fn generate_token(claims: &Claims) -> Result<String, AppError> {
    let jwt_config = JwtConfig::from_env()?;

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(AppError::JwtError)
}

/// Verify signature and expiry, returning the decoded claims
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let jwt_config = JwtConfig::from_env()?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::warn!("JWT verification failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token expired".to_string())
            }
            _ => AppError::Unauthorized("Invalid token".to_string()),
        }
    })?;

    Ok(token_data.claims)
}

/// Authenticated caller, resolved once per request by `require_auth` and
/// stored as a request extension.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

/// Bearer-token guard. Verifies the token, rejects revoked tokens and tokens
/// whose user no longer exists or is soft-deleted, then loads the caller with
/// role names into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AppError::Unauthorized("Invalid authorization header format".to_string()));
    }

    let token = auth_header.trim_start_matches("Bearer ");
    let claims = verify_token(token)?;

    if state.redis.is_token_denied(&claims.jti).await? {
        return Err(AppError::Unauthorized("Token has been revoked".to_string()));
    }

    // Revoked and soft-deleted accounts lose their sessions immediately.
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
        .bind(claims.sub)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    let roles = role_service::role_names_for_user(&state.db, user.id).await?;

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(AuthUser { user, roles });

    Ok(next.run(request).await)
}

/// Role guard layered after `require_auth`. Forbidden (403) is distinct from
/// the 401 the auth guard produces.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| AppError::Unauthorized("Unauthenticated".to_string()))?;

    if !auth_user.is_admin() {
        return Err(AppError::Forbidden("This action requires the admin role".to_string()));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_secret<T>(f: impl FnOnce() -> T) -> T {
        std::env::set_var("JWT_SECRET", "test-secret");
        f()
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        with_secret(|| {
            let claims = Claims::new(42, "jane@example.com".to_string(), 3600);
            let token = generate_token(&claims).unwrap();
            let decoded = verify_token(&token).unwrap();
            assert_eq!(decoded.sub, 42);
            assert_eq!(decoded.email, "jane@example.com");
            assert_eq!(decoded.jti, claims.jti);
        });
    }

    #[test]
    fn expired_token_is_rejected() {
        with_secret(|| {
            let mut claims = Claims::new(1, "jane@example.com".to_string(), 3600);
            claims.iat -= 7200;
            claims.exp -= 7200;
            let token = generate_token(&claims).unwrap();
            match verify_token(&token) {
                Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token expired"),
                other => panic!("expected unauthorized, got {:?}", other.map(|c| c.sub)),
            }
        });
    }

    #[test]
    fn each_issue_gets_a_fresh_jti() {
        let a = Claims::new(1, "a@example.com".to_string(), 60);
        let b = Claims::new(1, "a@example.com".to_string(), 60);
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn remaining_seconds_clamps_at_zero() {
        let mut claims = Claims::new(1, "a@example.com".to_string(), 60);
        claims.exp = Utc::now().timestamp() - 100;
        assert_eq!(claims.remaining_seconds(), 0);
    }
}
