use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use crate::config::AppState;
use crate::dto::{
    ChangeUserStatusRequest, CreateUserRequest, ListUsersQuery, Paginated, UpdateUserRequest,
    UserResponse,
};
use crate::interceptors::{ApiSuccess, AppError};
use crate::middleware::AuthUser;
use crate::services::UserService;
use crate::utils::UploadedFile;

/// Fields and avatar file collected from the multipart user form.
#[derive(Default)]
struct UserForm {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    mobile: Option<String>,
    password: Option<String>,
    password_confirmation: Option<String>,
    status: Option<String>,
    roles: Vec<String>,
    avatar: Option<UploadedFile>,
}

async fn read_user_form(mut multipart: Multipart) -> Result<UserForm, AppError> {
    let mut form = UserForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "avatar" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read avatar: {}", e)))?;
                form.avatar = Some(UploadedFile { file_name, content_type, bytes });
            }
            other => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field {}: {}", other, e)))?;
                match other {
                    "first_name" => form.first_name = Some(text),
                    "last_name" => form.last_name = Some(text),
                    "email" => form.email = Some(text),
                    "mobile" => form.mobile = Some(text),
                    "password" => form.password = Some(text),
                    "password_confirmation" => form.password_confirmation = Some(text),
                    "status" => form.status = Some(text),
                    "roles" | "roles[]" => form.roles.push(text),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

fn require_field(value: Option<String>, field: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::field_validation(field, "This field is required"))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<ApiSuccess<Paginated<UserResponse>>, AppError> {
    let user_service = UserService::new(state);
    let page = user_service.list(query).await?;

    Ok(ApiSuccess::from_data(page))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<ApiSuccess<UserResponse>, AppError> {
    let form = read_user_form(multipart).await?;

    let request = CreateUserRequest {
        first_name: require_field(form.first_name, "first_name")?,
        last_name: require_field(form.last_name, "last_name")?,
        email: require_field(form.email, "email")?,
        mobile: form.mobile.filter(|m| !m.is_empty()),
        password: require_field(form.password, "password")?,
        password_confirmation: require_field(form.password_confirmation, "password_confirmation")?,
        status: require_field(form.status, "status")?,
        roles: form.roles,
    };

    let user_service = UserService::new(state);
    let user = user_service.create(request, form.avatar, auth.id()).await?;

    Ok(ApiSuccess::new("User created successfully", user).with_status(StatusCode::CREATED))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<UserResponse>, AppError> {
    let user_service = UserService::new(state);
    let user = user_service.get(id).await?;

    Ok(ApiSuccess::from_data(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<ApiSuccess<UserResponse>, AppError> {
    let form = read_user_form(multipart).await?;

    let request = UpdateUserRequest {
        first_name: require_field(form.first_name, "first_name")?,
        last_name: require_field(form.last_name, "last_name")?,
        email: require_field(form.email, "email")?,
        mobile: form.mobile.filter(|m| !m.is_empty()),
        password: form.password.filter(|p| !p.is_empty()),
        password_confirmation: form.password_confirmation.filter(|p| !p.is_empty()),
        status: require_field(form.status, "status")?,
        roles: form.roles,
    };

    let user_service = UserService::new(state);
    let user = user_service.update(id, request, form.avatar, auth.id()).await?;

    Ok(ApiSuccess::new("User updated successfully", user))
}

pub async fn change_user_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ChangeUserStatusRequest>,
) -> Result<ApiSuccess<Value>, AppError> {
    let user_service = UserService::new(state);
    let (message, data) = user_service.change_status(id, request).await?;

    Ok(ApiSuccess::new(message, data))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<()>, AppError> {
    let user_service = UserService::new(state);
    user_service.delete(id).await?;

    Ok(ApiSuccess::<()>::message_only("User deleted successfully"))
}

pub async fn restore_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ApiSuccess<UserResponse>, AppError> {
    let user_service = UserService::new(state);
    let user = user_service.restore(id).await?;

    Ok(ApiSuccess::new("User restored successfully", user))
}
