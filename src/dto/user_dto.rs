use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::interceptors::AppError;
use crate::models::{RoleSummary, User, UserSummary};
use crate::utils::validation::{validate_user_status, MOBILE_REGEX, NAME_REGEX};

/// User wire representation. Computed fields (full_name, avatar_url) are
/// attached here, never stored; the password hash never appears.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub email: String,
    pub mobile: Option<String>,
    pub status: String,
    pub avatar: Option<String>,
    pub avatar_url: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<RoleSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserSummary>,
}

impl UserResponse {
    pub fn from_user(user: &User, public_url: &str) -> Self {
        let full_name = user.full_name();
        let avatar_url = match &user.avatar {
            Some(path) => format!("{}/{}", public_url.trim_end_matches('/'), path),
            None => format!(
                "https://ui-avatars.com/api/?name={}&background=random",
                full_name.replace(' ', "+")
            ),
        };

        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name,
            email: user.email.clone(),
            mobile: user.mobile.clone(),
            status: user.status.clone(),
            avatar: user.avatar.clone(),
            avatar_url,
            email_verified_at: user.email_verified_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
            roles: None,
            created_by: None,
            updated_by: None,
        }
    }

    pub fn with_roles(mut self, roles: Vec<RoleSummary>) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn with_audit(mut self, created_by: Option<UserSummary>, updated_by: Option<UserSummary>) -> Self {
        self.created_by = created_by;
        self.updated_by = updated_by;
        self
    }
}

/// Admin user creation. Multipart form; the avatar file is handled separately.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 1, max = 255, message = "First name is required"),
        regex(path = *NAME_REGEX, message = "First name may only contain letters, spaces and hyphens")
    )]
    pub first_name: String,

    #[validate(
        length(min = 1, max = 255, message = "Last name is required"),
        regex(path = *NAME_REGEX, message = "Last name may only contain letters, spaces and hyphens")
    )]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(
        length(max = 15, message = "Mobile may not be longer than 15 characters"),
        regex(path = *MOBILE_REGEX, message = "Mobile may only contain digits, spaces, + and -")
    )]
    pub mobile: Option<String>,

    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        must_match(other = password_confirmation, message = "Password confirmation does not match")
    )]
    pub password: String,

    pub password_confirmation: String,

    #[validate(custom(function = validate_user_status))]
    pub status: String,

    #[validate(length(min = 1, message = "At least one role is required"))]
    pub roles: Vec<String>,
}

/// Admin user update: full update, password optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 1, max = 255, message = "First name is required"),
        regex(path = *NAME_REGEX, message = "First name may only contain letters, spaces and hyphens")
    )]
    pub first_name: String,

    #[validate(
        length(min = 1, max = 255, message = "Last name is required"),
        regex(path = *NAME_REGEX, message = "Last name may only contain letters, spaces and hyphens")
    )]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(
        length(max = 15, message = "Mobile may not be longer than 15 characters"),
        regex(path = *MOBILE_REGEX, message = "Mobile may only contain digits, spaces, + and -")
    )]
    pub mobile: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    pub password_confirmation: Option<String>,

    #[validate(custom(function = validate_user_status))]
    pub status: String,

    #[validate(length(min = 1, message = "At least one role is required"))]
    pub roles: Vec<String>,
}

impl UpdateUserRequest {
    /// Confirmation check for the optional password. `must_match` only works
    /// on required fields, so this runs alongside the derive rules.
    pub fn check_password_confirmation(&self) -> Result<(), AppError> {
        if self.password.is_some() && self.password != self.password_confirmation {
            return Err(AppError::field_validation(
                "password",
                "Password confirmation does not match",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeUserStatusRequest {
    #[validate(custom(function = validate_user_status))]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub page: super::pagination::PageQuery,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate_request;

    fn valid_create() -> CreateUserRequest {
        CreateUserRequest {
            first_name: "Jane".to_string(),
            last_name: "Smith".to_string(),
            email: "jane@company.com".to_string(),
            mobile: Some("+84 987654321".to_string()),
            password: "12345678".to_string(),
            password_confirmation: "12345678".to_string(),
            status: "ACTIVE".to_string(),
            roles: vec!["user".to_string()],
        }
    }

    #[test]
    fn valid_create_request_passes() {
        assert!(validate_request(&valid_create()).is_ok());
    }

    #[test]
    fn mismatched_confirmation_fails() {
        let mut req = valid_create();
        req.password_confirmation = "different".to_string();
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn numeric_name_fails_charset_rule() {
        let mut req = valid_create();
        req.first_name = "Jane99".to_string();
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn empty_role_list_fails() {
        let mut req = valid_create();
        req.roles.clear();
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn optional_password_requires_matching_confirmation() {
        let req = UpdateUserRequest {
            password: Some("12345678".to_string()),
            password_confirmation: Some("87654321".to_string()),
            ..Default::default()
        };
        assert!(req.check_password_confirmation().is_err());

        let req = UpdateUserRequest {
            password: Some("12345678".to_string()),
            password_confirmation: Some("12345678".to_string()),
            ..Default::default()
        };
        assert!(req.check_password_confirmation().is_ok());
    }

    #[test]
    fn absent_password_skips_confirmation() {
        let req = UpdateUserRequest::default();
        assert!(req.check_password_confirmation().is_ok());
    }

    #[test]
    fn avatar_url_falls_back_to_generated_avatar() {
        let user = crate::models::user::tests_support::sample_user();
        let response = UserResponse::from_user(&user, "http://localhost:3000/storage");
        assert!(response.avatar_url.starts_with("https://ui-avatars.com/api/?name=Jane+Smith"));
    }

    #[test]
    fn avatar_url_uses_public_disk_when_present() {
        let mut user = crate::models::user::tests_support::sample_user();
        user.avatar = Some("avatars/20250101_120000_a1b2c3d4.png".to_string());
        let response = UserResponse::from_user(&user, "http://localhost:3000/storage/");
        assert_eq!(
            response.avatar_url,
            "http://localhost:3000/storage/avatars/20250101_120000_a1b2c3d4.png"
        );
    }
}
