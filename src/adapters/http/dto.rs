//! Shared HTTP DTOs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::ErrorCode;

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(code: ErrorCode, resource_type: &str, id: &str) -> Self {
        Self::new(code, format!("{} not found: {}", resource_type, id))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Attaches the offending field name.
    pub fn with_field(mut self, field: &str) -> Self {
        self.details = Some(serde_json::json!({ "field": field }));
        self
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_use_machine_readable_names() {
        let error = ErrorResponse::new(ErrorCode::CallNotPending, "already started");
        assert_eq!(error.code, "CALL_NOT_PENDING");
        assert_eq!(error.message, "already started");
    }

    #[test]
    fn not_found_names_resource() {
        let error = ErrorResponse::not_found(ErrorCode::CallNotFound, "Call", "abc-123");
        assert!(error.message.contains("Call"));
        assert!(error.message.contains("abc-123"));
    }

    #[test]
    fn field_details_serialize_only_when_set() {
        let plain = serde_json::to_value(ErrorResponse::bad_request("nope")).unwrap();
        assert!(plain.get("details").is_none());

        let with_field =
            serde_json::to_value(ErrorResponse::bad_request("nope").with_field("message")).unwrap();
        assert_eq!(with_field["details"]["field"], "message");
    }
}
