use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde_json::{json, Value};
use thiserror::Error;

use super::response::ApiError;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    RedisError(String),

    #[error("Validation failed")]
    ValidationError(Value),

    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Validation error for a single field.
    pub fn field_validation(field: &str, message: &str) -> Self {
        AppError::ValidationError(json!({ field: [message] }))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RedisError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        match self {
            AppError::ValidationError(errors) => ApiError::with_errors(
                "The given data was invalid",
                errors.clone(),
                self.status_code(),
            ),
            _ => ApiError::new(self.to_string(), self.status_code()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!("Application error: {:?}", self);
        } else {
            tracing::debug!("Request error: {:?}", self);
        }

        self.to_api_error().into_response()
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::RedisError(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for AppError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        AppError::RedisError(err.to_string())
    }
}

// Result type alias
pub type AppResult<T> = Result<T, AppError>;
