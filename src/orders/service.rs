use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::Identity;
use crate::catalog::{CatalogService, MenuItem};
use crate::config::AppConfig;
use crate::coupons::CouponLedger;
use crate::orders::{
    CreateOrderRequest, Delivery, DeliveryError, DeliveryRepository, DeliveryStatus, NewOrder,
    NewOrderLine, OrderError, OrderLineRequest, OrderRepository, OrderView, PaymentOptionRepository,
    PriceCalculator, PromotionRepository,
};
use crate::store::StoreError;

/// Service for order business logic
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    payment_options: Arc<dyn PaymentOptionRepository>,
    promotions: Arc<dyn PromotionRepository>,
    catalog: CatalogService,
    coupons: CouponLedger,
    validate_plain_order_options: bool,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        payment_options: Arc<dyn PaymentOptionRepository>,
        promotions: Arc<dyn PromotionRepository>,
        catalog: CatalogService,
        coupons: CouponLedger,
        config: &AppConfig,
    ) -> Self {
        Self {
            orders,
            payment_options,
            promotions,
            catalog,
            coupons,
            validate_plain_order_options: config.validate_plain_order_options,
        }
    }

    /// Place an order priced from the menu
    ///
    /// # Pricing
    /// - each line: menu price * quantity plus checked option prices * quantity
    /// - coupon discount subtracted once, total clamped at zero
    /// - `ordered_menus` is the distinct menu names joined with commas
    ///
    /// Option selections are checked against the catalog only when
    /// `validate_plain_order_options` is set.
    pub async fn place_order(
        &self,
        user_id: i32,
        request: CreateOrderRequest,
    ) -> Result<OrderView, OrderError> {
        self.ensure_payment_option(request.payment_option_id).await?;

        let mut menus: Vec<MenuItem> = Vec::with_capacity(request.items.len());
        let mut subtotals = Vec::with_capacity(request.items.len());

        for line in &request.items {
            Self::ensure_quantity(line)?;
            let menu = if self.validate_plain_order_options {
                self.catalog.validate_selection(line.menu_id, &line.menu_options).await?
            } else {
                self.catalog.get_menu_item(line.menu_id).await?
            };

            subtotals.push(PriceCalculator::line_total(line.quantity, menu.price, &line.menu_options));
            menus.push(menu);
        }

        let ordered_menus = PriceCalculator::ordered_menus_label(menus.iter().map(|m| m.name.as_str()));
        let total = PriceCalculator::calculate_total(&subtotals);

        self.commit(user_id, request, total, ordered_menus).await
    }

    /// Place an order against a promotion
    ///
    /// The promotion's flat price replaces menu base prices; only checked
    /// add-ons are charged on top. Options are always checked against the
    /// catalog. An expired promotion is reported as not found.
    pub async fn place_promotion_order(
        &self,
        user_id: i32,
        promotion_id: i32,
        request: CreateOrderRequest,
    ) -> Result<OrderView, OrderError> {
        let promotion = self
            .promotions
            .find_by_id(promotion_id)
            .await?
            .ok_or(OrderError::PromotionNotFound(promotion_id))?;

        if promotion.is_expired(Utc::now()) {
            debug!("Promotion {} expired at {}", promotion.id, promotion.expired_at);
            return Err(OrderError::PromotionNotFound(promotion_id));
        }

        self.ensure_payment_option(request.payment_option_id).await?;

        let mut subtotals = Vec::with_capacity(request.items.len() + 1);
        for line in &request.items {
            Self::ensure_quantity(line)?;
            self.catalog.validate_selection(line.menu_id, &line.menu_options).await?;
            subtotals.push(PriceCalculator::add_on_total(line.quantity, &line.menu_options));
        }
        subtotals.push(promotion.price);

        let total = PriceCalculator::calculate_total(&subtotals);
        self.commit(user_id, request, total, promotion.name).await
    }

    /// Get an order with its lines and delivery
    ///
    /// Only the placing user or an admin may read it.
    pub async fn get_order(&self, identity: Identity, order_id: i32) -> Result<OrderView, OrderError> {
        let view = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        if !identity.can_access(view.order.user_id) {
            return Err(OrderError::Unauthorized(order_id));
        }
        Ok(view)
    }

    async fn ensure_payment_option(&self, id: i32) -> Result<(), OrderError> {
        self.payment_options
            .find_by_id(id)
            .await?
            .map(|_| ())
            .ok_or(OrderError::PaymentOptionNotFound(id))
    }

    fn ensure_quantity(line: &OrderLineRequest) -> Result<(), OrderError> {
        if line.quantity <= 0 {
            return Err(OrderError::InvalidQuantity(format!(
                "Quantity must be positive, got {}",
                line.quantity
            )));
        }
        Ok(())
    }

    /// Apply the coupon, then persist order, lines, delivery and redemption together
    async fn commit(
        &self,
        user_id: i32,
        request: CreateOrderRequest,
        total: i64,
        ordered_menus: String,
    ) -> Result<OrderView, OrderError> {
        let coupon_id = request.coupon_id;
        let discount = match coupon_id {
            Some(coupon_id) => Some(self.coupons.redeemable_coupon(coupon_id, user_id).await?.discount),
            None => None,
        };
        let total_price = PriceCalculator::apply_discount(total, discount);

        let new_order = NewOrder {
            user_id,
            payment_option_id: request.payment_option_id,
            coupon_id,
            total_price,
            ordered_menus,
            lines: request
                .items
                .into_iter()
                .map(|line| NewOrderLine {
                    menu_id: line.menu_id,
                    quantity: line.quantity,
                    selected_options: line.menu_options,
                })
                .collect(),
            delivery_address: request.delivery_address,
        };

        let view = self.orders.place_order(new_order).await.map_err(|e| match (e, coupon_id) {
            // holding spent by a concurrent order between the check and the lock
            (StoreError::NotFound { .. }, Some(coupon_id)) => {
                OrderError::UserCouponNotFound { coupon_id, user_id }
            }
            (other, _) => OrderError::Store(other),
        })?;

        info!(
            "Order {} placed by user {}: total {}, {} line(s), coupon {:?}",
            view.order.id,
            user_id,
            view.order.total_price,
            view.lines.len(),
            view.order.coupon_id
        );
        Ok(view)
    }
}

/// Service for delivery status updates
#[derive(Clone)]
pub struct DeliveryService {
    deliveries: Arc<dyn DeliveryRepository>,
}

impl DeliveryService {
    pub fn new(deliveries: Arc<dyn DeliveryRepository>) -> Self {
        Self { deliveries }
    }

    /// Move a delivery to a new status
    ///
    /// Entering "on the way" stamps the delivery date; other statuses keep it.
    pub async fn update_status(&self, delivery_id: i32, status: &str) -> Result<Delivery, DeliveryError> {
        let status = DeliveryStatus::parse(status).map_err(DeliveryError::InvalidStatus)?;
        let stamp = status.stamps_delivery_date().then(Utc::now);

        let delivery = self
            .deliveries
            .update_status(delivery_id, status, stamp)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => DeliveryError::NotFound(delivery_id),
                other => DeliveryError::Store(other),
            })?;

        info!("Delivery {} is now '{}'", delivery.id, delivery.status);
        Ok(delivery)
    }

    pub async fn get_delivery(&self, delivery_id: i32) -> Result<Delivery, DeliveryError> {
        self.deliveries
            .find_by_id(delivery_id)
            .await?
            .ok_or(DeliveryError::NotFound(delivery_id))
    }
}
