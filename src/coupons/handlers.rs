// HTTP handlers for coupon endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::coupons::{Coupon, CreateCouponRequest, HeldCoupon, UpdateCouponRequest};
use crate::error::ApiError;

/// Handler for POST /api/coupons
/// Creates a coupon issued by the calling admin
#[utoipa::path(
    post,
    path = "/api/coupons",
    request_body = CreateCouponRequest,
    responses(
        (status = 201, description = "Coupon created", body = Coupon),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "coupons"
)]
pub async fn create_coupon_handler(
    State(state): State<crate::AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<Coupon>), ApiError> {
    request.validate()?;

    let coupon = state
        .coupons
        .create_coupon(admin.user_id, &request.description, request.discount)
        .await?;

    Ok((StatusCode::CREATED, Json(coupon)))
}

/// Handler for GET /api/user-coupons
/// Lists the coupons held by the authenticated user
#[utoipa::path(
    get,
    path = "/api/user-coupons",
    responses(
        (status = 200, description = "Coupons held by the caller", body = Vec<HeldCoupon>),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "coupons"
)]
pub async fn list_user_coupons_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<HeldCoupon>>, ApiError> {
    let coupons = state.coupons.list_user_coupons(user.user_id).await?;
    Ok(Json(coupons))
}

/// Handler for GET /api/coupons
/// Lists every coupon (admin only)
#[utoipa::path(
    get,
    path = "/api/coupons",
    responses(
        (status = 200, description = "All coupons", body = Vec<Coupon>),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "coupons"
)]
pub async fn list_coupons_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<Coupon>>, ApiError> {
    let coupons = state.coupons.list_coupons().await?;
    Ok(Json(coupons))
}

/// Handler for PUT /api/coupons/{id}
/// Edits a coupon; only its issuer may do so
#[utoipa::path(
    put,
    path = "/api/coupons/{id}",
    params(
        ("id" = i32, Path, description = "Coupon ID")
    ),
    request_body = UpdateCouponRequest,
    responses(
        (status = 200, description = "Coupon updated", body = Coupon),
        (status = 400, description = "Invalid input data"),
        (status = 403, description = "Caller is not an admin or not the issuer"),
        (status = 404, description = "Coupon not found")
    ),
    tag = "coupons"
)]
pub async fn update_coupon_handler(
    State(state): State<crate::AppState>,
    AdminUser(admin): AdminUser,
    Path(coupon_id): Path<i32>,
    Json(request): Json<UpdateCouponRequest>,
) -> Result<Json<Coupon>, ApiError> {
    request.validate()?;

    let coupon = state
        .coupons
        .update_coupon(admin.user_id, coupon_id, request.into())
        .await?;

    Ok(Json(coupon))
}

/// Handler for DELETE /api/coupons/{id}
#[utoipa::path(
    delete,
    path = "/api/coupons/{id}",
    params(
        ("id" = i32, Path, description = "Coupon ID")
    ),
    responses(
        (status = 204, description = "Coupon deleted"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Coupon not found")
    ),
    tag = "coupons"
)]
pub async fn delete_coupon_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(coupon_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.coupons.delete_coupon(coupon_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
