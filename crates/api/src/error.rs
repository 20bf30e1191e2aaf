//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use orders::ServiceError;
use payments::{GatewayError, PaymentError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Actor may not perform this operation.
    Forbidden(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Payment gateway failure.
    Gateway(GatewayError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Gateway(err) => {
                tracing::warn!(error = %err, "payment gateway failure");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        DomainError::Forbidden { .. } => (StatusCode::FORBIDDEN, err.to_string()),
        DomainError::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
        DomainError::InsufficientStock { .. }
        | DomainError::BelowMinimumOrder { .. }
        | DomainError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => ApiError::Domain(e),
            ServiceError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Domain(e) => ApiError::Domain(e),
            PaymentError::Gateway(e) => ApiError::Gateway(e),
            PaymentError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}
