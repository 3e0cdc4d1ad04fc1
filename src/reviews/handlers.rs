use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::reviews::{CreateReviewRequest, CustomerReview, ReviewReceipt};

/// Handler for POST /api/customer-reviews
/// Reviews an order line placed by the authenticated user
#[utoipa::path(
    post,
    path = "/api/customer-reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review recorded", body = ReviewReceipt),
        (status = 400, description = "Rating out of range"),
        (status = 403, description = "Order placed by another user"),
        (status = 404, description = "Order line not found"),
        (status = 409, description = "Order line already reviewed")
    ),
    tag = "reviews"
)]
pub async fn create_review_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewReceipt>), ApiError> {
    request.validate()?;

    let receipt = state.reviews.submit_review(user.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Handler for GET /api/menus/{id}/reviews
/// Lists reviews of a menu item
#[utoipa::path(
    get,
    path = "/api/menus/{id}/reviews",
    params(
        ("id" = i32, Path, description = "Menu ID")
    ),
    responses(
        (status = 200, description = "Reviews, newest first", body = Vec<CustomerReview>),
        (status = 404, description = "Menu not found")
    ),
    tag = "reviews"
)]
pub async fn get_menu_reviews_handler(
    State(state): State<crate::AppState>,
    Path(menu_id): Path<i32>,
) -> Result<Json<Vec<CustomerReview>>, ApiError> {
    let reviews = state.reviews.list_for_menu(menu_id).await?;
    Ok(Json(reviews))
}
