use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Domain model representing a customer review in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CustomerReview {
    pub id: i32,
    pub order_line_id: i32,
    pub user_id: i32,
    pub menu_id: i32,
    pub review: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for reviewing an order line
#[derive(Debug, Deserialize, Validate, Clone, ToSchema)]
pub struct CreateReviewRequest {
    pub order_line_id: i32,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    #[validate(length(max = 1000, message = "Review must not exceed 1000 characters"))]
    #[serde(default)]
    pub review: String,
}

/// Order line being reviewed, with the user who placed its order
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ReviewTarget {
    pub order_line_id: i32,
    pub order_id: i32,
    pub menu_id: i32,
    pub reviewed: bool,
    pub owner_id: i32,
}

/// Review about to be recorded
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub order_line_id: i32,
    pub user_id: i32,
    pub menu_id: i32,
    pub rating: i16,
    pub review: String,
}

/// Running rating of a menu item after a review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MenuRating {
    pub menu_id: i32,
    pub avg_rating: f64,
    pub rating_count: i32,
}

/// Response DTO for a submitted review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewReceipt {
    pub review: CustomerReview,
    pub menu_rating: MenuRating,
}
