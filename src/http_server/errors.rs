//! # HTTP API Errors
//!
//! Maps adapter and service failures to `{error, message, details?}` bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::schema::ValidationError;
use crate::service::ServiceError;

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Adapter Errors (400)
    // ==================
    /// Body is not parseable JSON
    #[error("Request body must be valid JSON")]
    BadJson,

    /// Body parsed but has the wrong shape
    #[error("{0}")]
    BadRequest(String),

    // ==================
    // Service Errors
    // ==================
    #[error("{0}")]
    Service(#[from] ServiceError),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadJson | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                ServiceError::TableNotFound(_)
                | ServiceError::ColumnNotFound(_)
                | ServiceError::RowNotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::ColumnExists(_) => StatusCode::CONFLICT,
                ServiceError::InvalidPayload(_) | ServiceError::Validation(_) => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Wire error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadJson => "BAD_JSON",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            // Column payload problems surface as plain bad requests
            ApiError::Service(ServiceError::InvalidPayload(_)) => "BAD_REQUEST",
            ApiError::Service(err) => err.kind(),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Service(ServiceError::Validation(_)) => "Invalid input data".to_string(),
            ApiError::Service(ServiceError::Storage(_)) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationError>>,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        let message = err.message();
        let error = err.code();
        let details = match err {
            ApiError::Service(ServiceError::Validation(details)) => Some(details),
            _ => None,
        };
        Self {
            error,
            message,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PayloadError;
    use crate::store::StoreError;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadJson.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ServiceError::RowNotFound("r".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ServiceError::ColumnExists("name".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(ServiceError::Storage(StoreError::Poisoned)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_payload_errors_are_bad_requests() {
        let err = ApiError::from(ServiceError::from(PayloadError::new("\"key\" must be a non-empty string")));
        assert_eq!(err.code(), "BAD_REQUEST");

        let body = ErrorResponse::from(err);
        assert_eq!(body.message, "\"key\" must be a non-empty string");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_validation_body_carries_details() {
        let err = ApiError::from(ServiceError::Validation(vec![ValidationError::required("name")]));
        let body = serde_json::to_value(ErrorResponse::from(err)).unwrap();

        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "Invalid input data");
        assert_eq!(body["details"][0]["field"], "name");
        assert_eq!(body["details"][0]["code"], "REQUIRED");
    }

    #[test]
    fn test_not_found_body_has_no_details() {
        let err = ApiError::from(ServiceError::TableNotFound("nope".into()));
        let body = serde_json::to_value(ErrorResponse::from(err)).unwrap();

        assert_eq!(body["error"], "TABLE_NOT_FOUND");
        assert_eq!(body["message"], "Table \"nope\" not found");
        assert!(body.get("details").is_none());
    }
}
