use crate::catalog::CatalogError;
use crate::coupons::CouponError;
use crate::error::ApiError;
use crate::store::StoreError;

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order with id {0} not found")]
    NotFound(i32),

    #[error("Menu with id {0} not found")]
    MenuNotFound(i32),

    #[error("Payment option with id {0} not found")]
    PaymentOptionNotFound(i32),

    /// Unknown or expired promotion
    #[error("Promotion with id {0} not found")]
    PromotionNotFound(i32),

    #[error("Coupon with id {0} not found")]
    CouponNotFound(i32),

    #[error("User {user_id} holds no coupon {coupon_id}")]
    UserCouponNotFound { coupon_id: i32, user_id: i32 },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Selected options are not part of the menu's catalog
    #[error("Invalid menu options: {0}")]
    InvalidOptions(String),

    #[error("Order {0} belongs to another user")]
    Unauthorized(i32),

    /// Ledger failure with no order-specific meaning
    #[error(transparent)]
    Coupon(CouponError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        OrderError::Store(err)
    }
}

impl From<CatalogError> for OrderError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MenuNotFound(id) => OrderError::MenuNotFound(id),
            CatalogError::InvalidSelection(msg) => OrderError::InvalidOptions(msg),
            CatalogError::Store(e) => OrderError::Store(e),
        }
    }
}

impl From<CouponError> for OrderError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::CouponNotFound(id) => OrderError::CouponNotFound(id),
            CouponError::HoldingNotFound { coupon_id, user_id } => {
                OrderError::UserCouponNotFound { coupon_id, user_id }
            }
            CouponError::Store(e) => OrderError::Store(e),
            other => OrderError::Coupon(other),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(id) => ApiError::not_found("Order", id),
            OrderError::MenuNotFound(id) => ApiError::not_found("Menu", id),
            OrderError::PaymentOptionNotFound(id) => ApiError::not_found("Payment option", id),
            OrderError::PromotionNotFound(id) => ApiError::not_found("Promotion", id),
            OrderError::CouponNotFound(id) => ApiError::not_found("Coupon", id),
            OrderError::UserCouponNotFound { coupon_id, user_id } => {
                ApiError::not_found("User coupon", format!("{}/{}", coupon_id, user_id))
            }
            OrderError::InvalidQuantity(msg) | OrderError::InvalidOptions(msg) => {
                ApiError::Malformed(msg)
            }
            OrderError::Unauthorized(_) => ApiError::Forbidden(err.to_string()),
            OrderError::Coupon(e) => ApiError::from(e),
            OrderError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Error types for delivery updates
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Delivery with id {0} not found")]
    NotFound(i32),

    #[error("{0}")]
    InvalidStatus(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for DeliveryError {
    fn from(err: StoreError) -> Self {
        DeliveryError::Store(err)
    }
}

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::NotFound(id) => ApiError::not_found("Delivery", id),
            DeliveryError::InvalidStatus(msg) => ApiError::Malformed(msg),
            DeliveryError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}
