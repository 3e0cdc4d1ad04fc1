use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgConnection, PgPool};
use tracing::debug;

use crate::catalog::OptionGroup;
use crate::coupons::repository::redeem_holding;
use crate::orders::{Delivery, DeliveryStatus, NewOrder, Order, OrderLine, OrderView, PaymentOption, Promotion};
use crate::store::{StoreError, StoreResult};

/// Persistence port for orders
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist header, lines and delivery as one unit of work
    ///
    /// When the order carries a coupon, one unit of the user's holding is
    /// redeemed in the same transaction. Nothing is written if any step fails.
    async fn place_order(&self, order: NewOrder) -> StoreResult<OrderView>;

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<OrderView>>;
}

#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Delivery>>;

    /// Set the status, and the delivery date when `stamp` is given
    async fn update_status(
        &self,
        id: i32,
        status: DeliveryStatus,
        stamp: Option<DateTime<Utc>>,
    ) -> StoreResult<Delivery>;
}

#[async_trait]
pub trait PaymentOptionRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<PaymentOption>>;
}

#[async_trait]
pub trait PromotionRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Promotion>>;
}

const ORDER_COLUMNS: &str =
    "id, user_id, order_date, payment_option_id, coupon_id, total_price, ordered_menus";
const DELIVERY_COLUMNS: &str = "id, order_id, address, status, delivered_at";

/// Order line joined with its menu name
#[derive(Debug, FromRow)]
struct OrderLineRow {
    id: i32,
    order_id: i32,
    menu_id: i32,
    menu_name: String,
    quantity: i32,
    selected_options: Json<Vec<OptionGroup>>,
    reviewed: bool,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: row.id,
            order_id: row.order_id,
            menu_id: row.menu_id,
            menu_name: row.menu_name,
            quantity: row.quantity,
            selected_options: row.selected_options.0,
            reviewed: row.reviewed,
        }
    }
}

/// Repository for order operations
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_view(conn: &mut PgConnection, id: i32) -> StoreResult<Option<OrderView>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT ol.id, ol.order_id, ol.menu_id, m.name AS menu_name,
                   ol.quantity, ol.selected_options, ol.reviewed
            FROM order_lines ol
            JOIN menus m ON m.id = ol.menu_id
            WHERE ol.order_id = $1
            ORDER BY ol.id
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        let delivery = sqlx::query_as::<_, Delivery>(&format!(
            "SELECT {} FROM deliveries WHERE order_id = $1",
            DELIVERY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StoreError::not_found("Delivery for order", id))?;

        Ok(Some(OrderView {
            order,
            lines: lines.into_iter().map(OrderLine::from).collect(),
            delivery,
        }))
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn place_order(&self, order: NewOrder) -> StoreResult<OrderView> {
        let mut tx = self.pool.begin().await?;

        if let Some(coupon_id) = order.coupon_id {
            let outcome = redeem_holding(&mut *tx, coupon_id, order.user_id).await?;
            debug!(
                "Coupon {} redeemed by user {}, {} unit(s) left",
                coupon_id,
                order.user_id,
                outcome.remaining_stock()
            );
        }

        let order_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (user_id, order_date, payment_option_id, coupon_id, total_price, ordered_menus)
            VALUES ($1, NOW(), $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(order.user_id)
        .bind(order.payment_option_id)
        .bind(order.coupon_id)
        .bind(order.total_price)
        .bind(&order.ordered_menus)
        .fetch_one(&mut *tx)
        .await?;

        for line in &order.lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, menu_id, quantity, selected_options, reviewed)
                VALUES ($1, $2, $3, $4, FALSE)
                "#,
            )
            .bind(order_id)
            .bind(line.menu_id)
            .bind(line.quantity)
            .bind(Json(&line.selected_options))
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("INSERT INTO deliveries (order_id, address, status) VALUES ($1, $2, $3)")
            .bind(order_id)
            .bind(&order.delivery_address)
            .bind(DeliveryStatus::Pending)
            .execute(&mut *tx)
            .await?;

        let view = Self::load_view(&mut *tx, order_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Order", order_id))?;

        tx.commit().await?;
        Ok(view)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<OrderView>> {
        let mut conn = self.pool.acquire().await?;
        Self::load_view(&mut *conn, id).await
    }
}

/// Repository for delivery operations
#[derive(Clone)]
pub struct PgDeliveryRepository {
    pool: PgPool,
}

impl PgDeliveryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryRepository for PgDeliveryRepository {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Delivery>> {
        let delivery = sqlx::query_as::<_, Delivery>(&format!(
            "SELECT {} FROM deliveries WHERE id = $1",
            DELIVERY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(delivery)
    }

    async fn update_status(
        &self,
        id: i32,
        status: DeliveryStatus,
        stamp: Option<DateTime<Utc>>,
    ) -> StoreResult<Delivery> {
        sqlx::query_as::<_, Delivery>(&format!(
            r#"
            UPDATE deliveries
            SET status = $2, delivered_at = COALESCE($3, delivered_at)
            WHERE id = $1
            RETURNING {}
            "#,
            DELIVERY_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .bind(stamp)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Delivery", id))
    }
}

#[derive(Clone)]
pub struct PgPaymentOptionRepository {
    pool: PgPool,
}

impl PgPaymentOptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentOptionRepository for PgPaymentOptionRepository {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<PaymentOption>> {
        let option = sqlx::query_as::<_, PaymentOption>(
            "SELECT id, name, description FROM payment_options WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(option)
    }
}

#[derive(Clone)]
pub struct PgPromotionRepository {
    pool: PgPool,
}

impl PgPromotionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromotionRepository for PgPromotionRepository {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Promotion>> {
        let promotion = sqlx::query_as::<_, Promotion>(
            "SELECT id, name, description, price, expired_at FROM promotions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promotion)
    }
}
