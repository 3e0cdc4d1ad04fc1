// Error handling module for the food ordering API
// Provides the HTTP error envelope every domain error is converted into

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

/// Main error type for the API
/// All handlers return Result<T, ApiError>
///
/// Each variant maps to one entry of the error taxonomy and a single HTTP status code.
#[derive(Debug)]
pub enum ApiError {
    /// Request body failed `validator` checks
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Request was well-formed JSON but semantically invalid
    /// (options outside the catalog, unknown delivery status)
    /// Maps to HTTP 400 Bad Request
    Malformed(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Duplicate review, game already answered
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Acting user ran out of a limited resource (game attempts)
    /// Maps to HTTP 403 Forbidden
    ResourceExhausted(String),

    /// Storage, transaction or external provider failure
    /// Maps to HTTP 500 Internal Server Error
    /// Details are logged, never returned to the client
    InternalError(String),

    /// Authentication failures: missing, malformed or expired token
    /// Maps to HTTP 401 Unauthorized
    Unauthorized(String),

    /// Acting user does not own the resource or lacks the role
    /// Maps to HTTP 403 Forbidden
    ///
    /// Ownership failures land here even though the domain errors call them
    /// `Unauthorized` (another user's order, order line or game, a coupon
    /// edited by an admin who did not issue it). A 401 always means the
    /// caller could not be authenticated.
    Forbidden(String),
}

/// Consistent error response structure
///
/// Provides both a machine-readable code and a human-readable message.
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CONFLICT")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Field-level validation errors, omitted when None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: String) -> Self {
        Self {
            error_code: error_code.to_string(),
            message,
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Logging level follows severity:
    /// - error!: internal failures (500-level)
    /// - warn!: conflicts and access failures
    /// - debug!: expected client errors (validation, not found)
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                let mut response =
                    ErrorResponse::new("VALIDATION_ERROR", "Request validation failed".to_string());
                response.details =
                    Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({})));
                (status, response)
            }
            ApiError::Malformed(message) => {
                debug!("Malformed request: {}", message);
                (status, ErrorResponse::new("MALFORMED_REQUEST", message.clone()))
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                (
                    status,
                    ErrorResponse::new("NOT_FOUND", format!("{} with id {} not found", resource, id)),
                )
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                (status, ErrorResponse::new("CONFLICT", message.clone()))
            }
            ApiError::ResourceExhausted(message) => {
                debug!("Resource exhausted: {}", message);
                (status, ErrorResponse::new("RESOURCE_EXHAUSTED", message.clone()))
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                (
                    status,
                    ErrorResponse::new(
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                    ),
                )
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);
                (status, ErrorResponse::new("UNAUTHORIZED", message.clone()))
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                (status, ErrorResponse::new("FORBIDDEN", message.clone()))
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::ResourceExhausted(_) => StatusCode::FORBIDDEN,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}
