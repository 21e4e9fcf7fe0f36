use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user_dto::UserResponse;
use crate::utils::validation::{MOBILE_REGEX, NAME_REGEX};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 255, message = "First name is required"),
        regex(path = *NAME_REGEX, message = "First name may only contain letters, spaces and hyphens")
    )]
    pub first_name: String,

    #[validate(
        length(max = 255, message = "Last name may not be longer than 255 characters"),
        regex(path = *NAME_REGEX, message = "Last name may only contain letters, spaces and hyphens")
    )]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        must_match(other = password_confirmation, message = "Password confirmation does not match")
    )]
    pub password: String,

    pub password_confirmation: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = 255, message = "First name may not be empty"),
        regex(path = *NAME_REGEX, message = "First name may only contain letters, spaces and hyphens")
    )]
    pub first_name: Option<String>,

    #[validate(
        length(max = 255, message = "Last name may not be longer than 255 characters"),
        regex(path = *NAME_REGEX, message = "Last name may only contain letters, spaces and hyphens")
    )]
    pub last_name: Option<String>,

    #[validate(
        length(max = 15, message = "Mobile may not be longer than 15 characters"),
        regex(path = *MOBILE_REGEX, message = "Mobile may only contain digits, spaces, + and -")
    )]
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        must_match(other = password_confirmation, message = "Password confirmation does not match")
    )]
    pub password: String,

    pub password_confirmation: String,
}

/// Registration returns the created user plus a usable token.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Login/refresh payload mirroring the bearer-token contract.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate_request;

    #[test]
    fn register_requires_matching_confirmation() {
        let req = RegisterRequest {
            first_name: "John".to_string(),
            last_name: Some("Doe".to_string()),
            email: "john@example.com".to_string(),
            password: "12345678".to_string(),
            password_confirmation: "87654321".to_string(),
        };
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn register_accepts_missing_last_name() {
        let req = RegisterRequest {
            first_name: "John".to_string(),
            last_name: None,
            email: "john@example.com".to_string(),
            password: "12345678".to_string(),
            password_confirmation: "12345678".to_string(),
        };
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn short_password_is_rejected() {
        let req = RegisterRequest {
            first_name: "John".to_string(),
            last_name: None,
            email: "john@example.com".to_string(),
            password: "1234567".to_string(),
            password_confirmation: "1234567".to_string(),
        };
        assert!(validate_request(&req).is_err());
    }
}
