//! `AppError` and the unified `ApiResponse` envelope

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Structured detail map attached to errors (sorted keys for stable output)
pub type ErrorDetails = BTreeMap<String, Value>;

/// Application error carrying a code, a message and optional details
///
/// Workflow operations and handlers speak this type exclusively; the
/// HTTP status and wire envelope are derived from the [`ErrorCode`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors or extra context
    pub details: Option<ErrorDetails>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach one detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(ErrorDetails::new)
            .insert(key.into(), value.into());
        self
    }

    /// HTTP status derived from the error code
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", resource))
            .with_detail("resource", resource)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Unified message so login failures cannot enumerate accounts
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }
}

/// Result alias used across workflows and handlers
pub type AppResult<T> = Result<T, AppError>;

/// Wire envelope shared by every endpoint
///
/// `code` 0 means success and carries `data`; any other code carries the
/// error `message` plus optional `details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: None,
            details: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message,
            data: None,
            details: err.details,
        }
    }
}

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        // System errors get logged at the boundary; client errors don't
        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                category = self.code.category().name(),
                message = %self.message,
                "System error surfaced to client"
            );
        }

        let status = self.http_status();
        (status, Json(ApiResponse::<()>::error(&self))).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = match self.code {
            None | Some(0) => StatusCode::OK,
            Some(raw) => ErrorCode::try_from(raw)
                .map(|code| code.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        };

        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_and_custom_messages() {
        let err = AppError::new(ErrorCode::OrderNotFound);
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        assert_eq!(err.message, "Order not found");
        assert!(err.details.is_none());

        let err = AppError::with_message(ErrorCode::InsufficientStock, "Only 3 left");
        assert_eq!(err.message, "Only 3 left");
    }

    #[test]
    fn test_details_accumulate() {
        let err = AppError::validation("Bad reservation payload")
            .with_detail("field", "quantity")
            .with_detail("min", 1);

        let details = err.details.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details.get("field").unwrap(), "quantity");
        assert_eq!(details.get("min").unwrap(), 1);
    }

    #[test]
    fn test_status_derivation() {
        let cases = [
            (AppError::new(ErrorCode::NotFound), StatusCode::NOT_FOUND),
            (AppError::unauthorized(), StatusCode::UNAUTHORIZED),
            (
                AppError::forbidden("suppliers only"),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::new(ErrorCode::InvalidStatusTransition),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::database("rocksdb unavailable"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.http_status(), status, "{}", err.code);
        }
    }

    #[test]
    fn test_not_found_carries_resource_detail() {
        let err = AppError::not_found("Reservation");
        assert_eq!(err.message, "Reservation not found");
        assert_eq!(
            err.details.unwrap().get("resource").unwrap(),
            "Reservation"
        );
    }

    #[test]
    fn test_envelope_success() {
        let response = ApiResponse::success(vec!["cinnamon"]);
        assert_eq!(response.code, Some(0));
        assert_eq!(response.message, "OK");
        assert_eq!(response.data.unwrap(), vec!["cinnamon"]);
    }

    #[test]
    fn test_envelope_error_keeps_code_and_details() {
        let err = AppError::new(ErrorCode::RatingDuplicate).with_detail("ratee", "supplier:ceylon");
        let response = ApiResponse::<()>::error(&err);

        assert_eq!(response.code, Some(8001));
        assert!(response.data.is_none());
        assert!(response.details.unwrap().contains_key("ratee"));
    }

    #[test]
    fn test_envelope_from_error() {
        let response: ApiResponse<String> = AppError::new(ErrorCode::InternalError).into();
        assert_eq!(response.code, Some(9001));
        assert_eq!(response.message, "Internal server error");
    }

    #[test]
    fn test_envelope_serialization_shape() {
        let json = serde_json::to_string(&ApiResponse::success(42)).unwrap();
        assert_eq!(json, r#"{"code":0,"message":"OK","data":42}"#);

        let parsed: ApiResponse<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.data, Some(42));
    }
}
