use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::Serialize;
use serde_json::Value;

/// Success envelope: `{"status": "success", "message"?, "data"?}`
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip)]
    status_code: StatusCode,
}

/// Error envelope: `{"status": "error", "message", "errors"?}`
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(skip)]
    status_code: StatusCode,
}

impl<T: Serialize> ApiSuccess<T> {
    /// Success response with a message and data payload
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            data: Some(data),
            status_code: StatusCode::OK,
        }
    }

    /// Success response carrying only data
    pub fn from_data(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
            status_code: StatusCode::OK,
        }
    }

    /// Success response with no data payload
    pub fn message_only(message: impl Into<String>) -> ApiSuccess<()> {
        ApiSuccess {
            status: "success",
            message: Some(message.into()),
            data: None,
            status_code: StatusCode::OK,
        }
    }

    /// Override the HTTP status code (e.g. 201 for creations)
    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }
}

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            status: "error",
            message: message.into(),
            errors: None,
            status_code,
        }
    }

    /// Error response carrying per-field validation messages
    pub fn with_errors(message: impl Into<String>, errors: Value, status_code: StatusCode) -> Self {
        Self {
            status: "error",
            message: message.into(),
            errors: Some(errors),
            status_code,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        let status = self.status_code;
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_skips_empty_fields() {
        let response = ApiSuccess::from_data(json!({"id": 1}));
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body, json!({"status": "success", "data": {"id": 1}}));
    }

    #[test]
    fn error_envelope_carries_field_errors() {
        let err = ApiError::with_errors(
            "The given data was invalid",
            json!({"email": ["Invalid email format"]}),
            StatusCode::UNPROCESSABLE_ENTITY,
        );
        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["errors"]["email"][0], "Invalid email format");
    }

    #[test]
    fn message_only_has_no_data_key() {
        let response = ApiSuccess::<()>::message_only("Successfully logged out");
        let body = serde_json::to_value(&response).unwrap();
        assert!(body.get("data").is_none());
        assert_eq!(body["message"], "Successfully logged out");
    }
}
