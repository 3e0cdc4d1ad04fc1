use crate::error::ApiError;
use crate::store::StoreError;

/// Error types for coupon ledger operations
#[derive(Debug, thiserror::Error)]
pub enum CouponError {
    #[error("Coupon with id {0} not found")]
    CouponNotFound(i32),

    /// The user holds no unit of this coupon
    #[error("User {user_id} holds no coupon {coupon_id}")]
    HoldingNotFound { coupon_id: i32, user_id: i32 },

    /// Discounts are subtracted from totals and may not be negative
    #[error("Invalid discount: {0}")]
    InvalidDiscount(i64),

    /// Only the issuing admin may edit a coupon
    #[error("Coupon {coupon_id} was not issued by user {user_id}")]
    NotIssuer { coupon_id: i32, user_id: i32 },

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CouponError {
    fn from(err: StoreError) -> Self {
        CouponError::Store(err)
    }
}

impl From<CouponError> for ApiError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::CouponNotFound(id) => ApiError::not_found("Coupon", id),
            CouponError::HoldingNotFound { coupon_id, user_id } => {
                ApiError::not_found("User coupon", format!("{}/{}", coupon_id, user_id))
            }
            CouponError::InvalidDiscount(_) => ApiError::Malformed(err.to_string()),
            CouponError::NotIssuer { .. } => ApiError::Forbidden(err.to_string()),
            CouponError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}
