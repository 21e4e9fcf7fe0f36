use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::config::AppState;
use crate::dto::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, RegisterResponse, TokenResponse,
    UpdateProfileRequest, UserResponse,
};
use crate::interceptors::{ApiSuccess, AppError};
use crate::middleware::{AuthUser, Claims};
use crate::services::UserService;

/// Register a new user and issue a session token
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<ApiSuccess<RegisterResponse>, AppError> {
    let user_service = UserService::new(state);
    let response = user_service.register(request).await?;

    Ok(ApiSuccess::new("Registration successful", response).with_status(StatusCode::CREATED))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<ApiSuccess<TokenResponse>, AppError> {
    let user_service = UserService::new(state);
    let response = user_service.login(request).await?;

    Ok(ApiSuccess::new("Login successful", response))
}

/// Current authenticated user with roles
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ApiSuccess<UserResponse>, AppError> {
    let user_service = UserService::new(state);
    let user = user_service.me(&auth).await?;

    Ok(ApiSuccess::from_data(user))
}

/// Invalidate the presented token and issue a replacement
pub async fn refresh(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiSuccess<TokenResponse>, AppError> {
    let user_service = UserService::new(state);
    let response = user_service.refresh(&auth, &claims).await?;

    Ok(ApiSuccess::new("Token refreshed", response))
}

/// Invalidate the presented token
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiSuccess<()>, AppError> {
    let user_service = UserService::new(state);
    user_service.logout(&claims).await?;

    Ok(ApiSuccess::<()>::message_only("Successfully logged out"))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<ApiSuccess<UserResponse>, AppError> {
    let user_service = UserService::new(state);
    let user = user_service.update_profile(&auth, request).await?;

    Ok(ApiSuccess::new("Profile updated successfully", user))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<()>, AppError> {
    let user_service = UserService::new(state);
    user_service.change_password(&auth, request).await?;

    Ok(ApiSuccess::<()>::message_only("Password changed successfully"))
}
