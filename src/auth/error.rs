// Authentication and authorization error types

use axum::response::{IntoResponse, Response};

use crate::auth::models::Role;
use crate::error::ApiError;

/// Authentication and authorization error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    /// User lacks the role required by the operation
    #[error("Insufficient permissions: required role '{required}', but user has role '{actual}'")]
    InsufficientPermissions { required: Role, actual: Role },
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::ExpiredToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::TokenGenerationError(msg) => ApiError::InternalError(msg),
            AuthError::InsufficientPermissions { required, .. } => ApiError::Forbidden(format!(
                "Insufficient permissions: required role '{}'",
                required
            )),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
