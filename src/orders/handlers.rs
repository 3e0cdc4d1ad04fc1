// HTTP handlers for order and delivery endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::error::ApiError;
use crate::orders::{CreateOrderRequest, Delivery, OrderView, UpdateDeliveryRequest};

/// Handler for POST /api/orders
/// Places an order for the authenticated user
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderView),
        (status = 400, description = "Invalid input data or options"),
        (status = 404, description = "Menu, payment option or coupon not found")
    ),
    tag = "orders"
)]
pub async fn create_order_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderView>), ApiError> {
    request.validate()?;

    let order = state.orders.place_order(user.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Handler for POST /api/promotions/{id}/orders
/// Places an order against a promotion
#[utoipa::path(
    post,
    path = "/api/promotions/{id}/orders",
    params(
        ("id" = i32, Path, description = "Promotion ID")
    ),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderView),
        (status = 400, description = "Invalid input data or options"),
        (status = 404, description = "Promotion missing or expired")
    ),
    tag = "orders"
)]
pub async fn create_promotion_order_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(promotion_id): Path<i32>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderView>), ApiError> {
    request.validate()?;

    let order = state
        .orders
        .place_promotion_order(user.user_id, promotion_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Handler for GET /api/orders/{id}
/// Retrieves an order; authorization is checked in the service layer
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with lines and delivery", body = OrderView),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn get_order_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderView>, ApiError> {
    let order = state.orders.get_order(user.identity(), order_id).await?;
    Ok(Json(order))
}

/// Handler for PUT /api/deliveries/{id}
/// Updates the status of a delivery (admin only)
#[utoipa::path(
    put,
    path = "/api/deliveries/{id}",
    params(
        ("id" = i32, Path, description = "Delivery ID")
    ),
    request_body = UpdateDeliveryRequest,
    responses(
        (status = 200, description = "Delivery updated", body = Delivery),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Delivery not found")
    ),
    tag = "orders"
)]
pub async fn update_delivery_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(delivery_id): Path<i32>,
    Json(request): Json<UpdateDeliveryRequest>,
) -> Result<Json<Delivery>, ApiError> {
    let delivery = state
        .deliveries
        .update_status(delivery_id, &request.status)
        .await?;

    Ok(Json(delivery))
}

/// Handler for GET /api/deliveries/{id}
/// Reads the current status of a delivery (admin only)
#[utoipa::path(
    get,
    path = "/api/deliveries/{id}",
    params(
        ("id" = i32, Path, description = "Delivery ID")
    ),
    responses(
        (status = 200, description = "Delivery", body = Delivery),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Delivery not found")
    ),
    tag = "orders"
)]
pub async fn get_delivery_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
    Path(delivery_id): Path<i32>,
) -> Result<Json<Delivery>, ApiError> {
    let delivery = state.deliveries.get_delivery(delivery_id).await?;
    Ok(Json(delivery))
}
