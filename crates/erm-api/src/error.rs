//! API error types and handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use erm_application::ApplicationError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, invalid or expired credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authenticated but not allowed
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// Requested record does not exist or is not visible to the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or invalid input
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Unique key taken or conflicting state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unexpected failure
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Request body could not be parsed
    #[error("Invalid JSON body: {0}")]
    Json(#[from] JsonRejection),
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::ValidationFailed(message) => ApiError::BadRequest(message),
            ApplicationError::DomainError(message) => ApiError::BadRequest(message),
            ApplicationError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} {}", entity, id))
            }
            ApplicationError::Unauthorized(message) => ApiError::Authentication(message),
            ApplicationError::Forbidden(message) => ApiError::Authorization(message),
            ApplicationError::Conflict(message) => ApiError::Conflict(message),
            ApplicationError::RepositoryError(message)
            | ApplicationError::CredentialError(message) => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Authentication(_) => (StatusCode::UNAUTHORIZED, "authentication_error"),
            ApiError::Authorization(_) => (StatusCode::FORBIDDEN, "authorization_error"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ApiError::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
        };

        // Internal details stay in the log
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_errors_map_to_status_codes() {
        let cases = [
            (ApplicationError::ValidationFailed("x".into()), StatusCode::BAD_REQUEST),
            (ApplicationError::not_found("Risk", 3), StatusCode::NOT_FOUND),
            (ApplicationError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApplicationError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApplicationError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                ApplicationError::RepositoryError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
