use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::catalog::OptionGroup;

/// Delivery status, restricted to a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text")]
pub enum DeliveryStatus {
    #[serde(rename = "pending")]
    #[sqlx(rename = "pending")]
    Pending,
    #[serde(rename = "on the way")]
    #[sqlx(rename = "on the way")]
    OnTheWay,
    #[serde(rename = "delivered")]
    #[sqlx(rename = "delivered")]
    Delivered,
}

impl DeliveryStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::OnTheWay => "on the way",
            DeliveryStatus::Delivered => "delivered",
        }
    }

    /// Parse status from string
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(DeliveryStatus::Pending),
            "on the way" => Ok(DeliveryStatus::OnTheWay),
            "delivered" => Ok(DeliveryStatus::Delivered),
            _ => Err(format!("Invalid delivery status: {}", s)),
        }
    }

    /// Whether entering this status stamps the delivery date
    pub fn stamps_delivery_date(&self) -> bool {
        matches!(self, DeliveryStatus::OnTheWay)
    }
}

impl Default for DeliveryStatus {
    fn default() -> Self {
        DeliveryStatus::Pending
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub order_date: DateTime<Utc>,
    pub payment_option_id: i32,
    pub coupon_id: Option<i32>,
    /// Minor currency units, never negative
    pub total_price: i64,
    /// Distinct ordered menu names joined with commas
    pub ordered_menus: String,
}

/// One menu item, quantity and selection within an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub id: i32,
    pub order_id: i32,
    pub menu_id: i32,
    pub menu_name: String,
    pub quantity: i32,
    pub selected_options: Vec<OptionGroup>,
    pub reviewed: bool,
}

/// Delivery record owned by exactly one order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Delivery {
    pub id: i32,
    pub order_id: i32,
    pub address: String,
    pub status: DeliveryStatus,
    /// Set when the delivery goes on the way
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Order reloaded with its lines and delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderView {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub delivery: Delivery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PaymentOption {
    pub id: i32,
    pub name: String,
    pub description: String,
}

/// Bundle sold at a flat price until it expires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Promotion {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub expired_at: DateTime<Utc>,
}

impl Promotion {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expired_at < now
    }
}

/// Line about to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub menu_id: i32,
    pub quantity: i32,
    pub selected_options: Vec<OptionGroup>,
}

/// Order about to be persisted together with its lines and delivery
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i32,
    pub payment_option_id: i32,
    pub coupon_id: Option<i32>,
    pub total_price: i64,
    pub ordered_menus: String,
    pub lines: Vec<NewOrderLine>,
    pub delivery_address: String,
}

/// Request DTO for one order line
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderLineRequest {
    pub menu_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[serde(default)]
    pub menu_options: Vec<OptionGroup>,
}

/// Request DTO for placing an order, plain or promotion
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub coupon_id: Option<i32>,
    pub payment_option_id: i32,
    #[validate(length(min = 1, message = "Delivery address is required"))]
    pub delivery_address: String,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderLineRequest>,
}

/// Request DTO for updating a delivery
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeliveryRequest {
    /// One of "pending", "on the way", "delivered"
    pub status: String,
}
