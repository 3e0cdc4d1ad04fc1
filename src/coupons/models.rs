use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Description stamped on coupons minted for a correct trivia answer
pub const GAME_PRIZE_DESCRIPTION: &str = "Game Prize Coupon";

/// Coupon definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Coupon {
    pub id: i32,
    pub code: Uuid,
    pub description: String,
    pub issuer_id: i32,
    /// Flat amount subtracted from an order total
    pub discount: i64,
    pub availability: bool,
    pub created_at: DateTime<Utc>,
}

/// Coupon about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub code: Uuid,
    pub description: String,
    pub issuer_id: i32,
    pub discount: i64,
}

impl NewCoupon {
    /// Draft an available coupon with a fresh unique code
    pub fn new(issuer_id: i32, description: impl Into<String>, discount: i64) -> Self {
        Self {
            code: Uuid::new_v4(),
            description: description.into(),
            issuer_id,
            discount,
        }
    }

    /// Reward coupon for a correctly answered game
    pub fn game_prize(user_id: i32, score: i64) -> Self {
        Self::new(user_id, GAME_PRIZE_DESCRIPTION, score)
    }
}

/// Stock of one coupon held by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CouponHolding {
    pub id: i32,
    pub coupon_id: i32,
    pub user_id: i32,
    pub stock: i32,
}

/// Result of redeeming one unit of a holding
#[derive(Debug, Clone, PartialEq)]
pub enum RedeemOutcome {
    /// Units are left after the decrement
    Remaining(CouponHolding),
    /// The last unit was used and the holding deleted
    Retired { coupon_id: i32, user_id: i32 },
}

impl RedeemOutcome {
    pub fn remaining_stock(&self) -> i32 {
        match self {
            RedeemOutcome::Remaining(holding) => holding.stock,
            RedeemOutcome::Retired { .. } => 0,
        }
    }
}

/// Holding joined with its coupon, as listed to the holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HeldCoupon {
    pub holding_id: i32,
    pub stock: i32,
    pub coupon: Coupon,
}

/// Request DTO for creating a coupon
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCouponRequest {
    #[validate(length(min = 1, max = 255))]
    pub description: String,

    #[validate(range(min = 1))]
    pub discount: i64,
}

/// Request DTO for editing a coupon
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCouponRequest {
    #[validate(length(min = 1, max = 255))]
    pub description: String,

    #[validate(range(min = 0))]
    pub discount: i64,

    pub availability: bool,
}

/// Editable coupon fields as written by the repository
#[derive(Debug, Clone, PartialEq)]
pub struct CouponChanges {
    pub description: String,
    pub discount: i64,
    pub availability: bool,
}

impl From<UpdateCouponRequest> for CouponChanges {
    fn from(request: UpdateCouponRequest) -> Self {
        Self {
            description: request.description,
            discount: request.discount,
            availability: request.availability,
        }
    }
}
