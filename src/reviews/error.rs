use crate::error::ApiError;
use crate::store::StoreError;

/// Service-level errors for the reviews system
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Order line with id {0} not found")]
    LineNotFound(i32),

    #[error("Menu with id {0} not found")]
    MenuNotFound(i32),

    /// Ratings run from 1 to 5
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i16),

    /// The order line already carries a review
    #[error("Order line {0} has already been reviewed")]
    DuplicateReview(i32),

    /// Reviewer did not place the order
    #[error("Order line {0} belongs to another user")]
    Unauthorized(i32),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ReviewError {
    fn from(err: StoreError) -> Self {
        ReviewError::Store(err)
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::InvalidRating(_) => ApiError::Malformed(err.to_string()),
            ReviewError::LineNotFound(id) => ApiError::not_found("Order line", id),
            ReviewError::MenuNotFound(id) => ApiError::not_found("Menu", id),
            ReviewError::DuplicateReview(_) => ApiError::Conflict {
                message: err.to_string(),
            },
            ReviewError::Unauthorized(_) => ApiError::Forbidden(err.to_string()),
            ReviewError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}
