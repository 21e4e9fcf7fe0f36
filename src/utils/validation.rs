use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::interceptors::AppError;
use crate::models::user::{STATUS_ACTIVE, STATUS_INACTIVE};

/// Letters (any script), spaces and hyphens: the charset allowed for names.
pub static NAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\pL\s\-]+$").unwrap());

/// Digits, plus sign, hyphens and spaces for phone numbers.
pub static MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9+\-\s]+$").unwrap());

/// Validate a request struct, rejecting at the boundary before any mutation.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request
        .validate()
        .map_err(|e| AppError::ValidationError(errors_to_value(&e)))
}

/// Flatten validator output into `{field: [messages]}`.
fn errors_to_value(errors: &ValidationErrors) -> Value {
    let map: serde_json::Map<String, Value> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let messages: Vec<Value> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| json!(m))
                        .unwrap_or_else(|| json!(format!("{} is invalid", field)))
                })
                .collect();
            (field.to_string(), Value::Array(messages))
        })
        .collect();

    Value::Object(map)
}

pub fn validate_user_status(status: &str) -> Result<(), ValidationError> {
    if status == STATUS_ACTIVE || status == STATUS_INACTIVE {
        Ok(())
    } else {
        let mut err = ValidationError::new("status");
        err.message = Some("Status must be ACTIVE or INACTIVE".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
        password: String,
    }

    #[test]
    fn invalid_fields_are_enumerated_per_field() {
        let probe = Probe {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let err = validate_request(&probe).unwrap_err();
        match err {
            AppError::ValidationError(value) => {
                assert_eq!(value["email"][0], "Invalid email format");
                assert_eq!(value["password"][0], "Password must be at least 8 characters");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn name_regex_accepts_unicode_letters() {
        assert!(NAME_REGEX.is_match("José María"));
        assert!(NAME_REGEX.is_match("Anne-Marie"));
        assert!(!NAME_REGEX.is_match("R2-D2"));
        assert!(!NAME_REGEX.is_match("jane@doe"));
    }

    #[test]
    fn mobile_regex_allows_digits_and_separators() {
        assert!(MOBILE_REGEX.is_match("+84 987-654-321"));
        assert!(!MOBILE_REGEX.is_match("phone"));
    }

    #[test]
    fn status_must_be_a_known_value() {
        assert!(validate_user_status("ACTIVE").is_ok());
        assert!(validate_user_status("INACTIVE").is_ok());
        assert!(validate_user_status("archived").is_err());
    }
}
