// In-memory repositories for service and router tests
//
// Every port is implemented over one shared table set. Writes that must be
// atomic run on a copy of the tables which only replaces the original when
// the whole unit of work succeeds, so an injected fault leaves no trace.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::catalog::{MenuItem, MenuRepository};
use crate::coupons::{
    Coupon, CouponChanges, CouponHolding, CouponRepository, HeldCoupon, NewCoupon, RedeemOutcome,
};
use crate::games::{
    Game, GameRepository, LeaderboardEntry, LeaderboardStanding, Player, PlayerRepository,
    RewardReceipt, TriviaError, TriviaProvider, TriviaQuestion,
};
use crate::orders::{
    Delivery, DeliveryRepository, DeliveryStatus, NewOrder, NewOrderLine, Order, OrderLine,
    OrderRepository, OrderView, PaymentOption, PaymentOptionRepository, Promotion,
    PromotionRepository,
};
use crate::reviews::{
    CustomerReview, MenuRating, NewReview, RatingCalculator, ReviewReceipt, ReviewRepository,
    ReviewTarget,
};
use crate::store::{StoreError, StoreResult};

/// Write step that can be made to fail once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    DeliveryInsert,
    MenuRatingUpdate,
    LeaderboardUpsert,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    next_id: i32,
    menus: BTreeMap<i32, MenuItem>,
    payment_options: BTreeMap<i32, PaymentOption>,
    promotions: BTreeMap<i32, Promotion>,
    coupons: BTreeMap<i32, Coupon>,
    holdings: BTreeMap<i32, CouponHolding>,
    orders: BTreeMap<i32, Order>,
    lines: BTreeMap<i32, OrderLine>,
    deliveries: BTreeMap<i32, Delivery>,
    reviews: BTreeMap<i32, CustomerReview>,
    players: BTreeMap<i32, Player>,
    games: BTreeMap<i32, Game>,
    leaderboard: BTreeMap<i32, i64>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: Tables,
    armed: Option<Fault>,
}

/// Shared in-memory store; clones see the same data
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

fn trip(armed: &mut Option<Fault>, fault: Fault) -> StoreResult<()> {
    if *armed == Some(fault) {
        *armed = None;
        return Err(StoreError::Database(format!("injected fault: {:?}", fault)));
    }
    Ok(())
}

impl Tables {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn view(&self, order_id: i32) -> StoreResult<Option<OrderView>> {
        let Some(order) = self.orders.get(&order_id).cloned() else {
            return Ok(None);
        };

        let lines = self
            .lines
            .values()
            .filter(|line| line.order_id == order_id)
            .cloned()
            .collect();

        let delivery = self
            .deliveries
            .values()
            .find(|delivery| delivery.order_id == order_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Delivery for order", order_id))?;

        Ok(Some(OrderView {
            order,
            lines,
            delivery,
        }))
    }

    fn insert_coupon(&mut self, draft: &NewCoupon) -> Coupon {
        let coupon = Coupon {
            id: self.allocate_id(),
            code: draft.code,
            description: draft.description.clone(),
            issuer_id: draft.issuer_id,
            discount: draft.discount,
            availability: true,
            created_at: Utc::now(),
        };
        self.coupons.insert(coupon.id, coupon.clone());
        coupon
    }

    fn holding_mut(&mut self, coupon_id: i32, user_id: i32) -> Option<&mut CouponHolding> {
        self.holdings
            .values_mut()
            .find(|h| h.coupon_id == coupon_id && h.user_id == user_id)
    }

    fn issue_or_increment(&mut self, coupon_id: i32, user_id: i32) -> CouponHolding {
        if let Some(holding) = self.holding_mut(coupon_id, user_id) {
            holding.stock += 1;
            return holding.clone();
        }

        let holding = CouponHolding {
            id: self.allocate_id(),
            coupon_id,
            user_id,
            stock: 1,
        };
        self.holdings.insert(holding.id, holding.clone());
        holding
    }

    fn redeem(&mut self, coupon_id: i32, user_id: i32) -> StoreResult<RedeemOutcome> {
        let holding = self
            .holding_mut(coupon_id, user_id)
            .filter(|h| h.stock > 0)
            .ok_or_else(|| StoreError::not_found("User coupon", format!("{}/{}", coupon_id, user_id)))?;

        holding.stock -= 1;
        if holding.stock > 0 {
            return Ok(RedeemOutcome::Remaining(holding.clone()));
        }

        let id = holding.id;
        self.holdings.remove(&id);
        Ok(RedeemOutcome::Retired { coupon_id, user_id })
    }

    fn place_order(&mut self, armed: &mut Option<Fault>, order: NewOrder) -> StoreResult<OrderView> {
        if let Some(coupon_id) = order.coupon_id {
            self.redeem(coupon_id, order.user_id)?;
        }

        let order_id = self.allocate_id();
        self.orders.insert(
            order_id,
            Order {
                id: order_id,
                user_id: order.user_id,
                order_date: Utc::now(),
                payment_option_id: order.payment_option_id,
                coupon_id: order.coupon_id,
                total_price: order.total_price,
                ordered_menus: order.ordered_menus,
            },
        );

        for line in order.lines {
            let menu_name = self
                .menus
                .get(&line.menu_id)
                .map(|menu| menu.name.clone())
                .ok_or_else(|| StoreError::not_found("Menu", line.menu_id))?;

            let id = self.allocate_id();
            self.lines.insert(
                id,
                OrderLine {
                    id,
                    order_id,
                    menu_id: line.menu_id,
                    menu_name,
                    quantity: line.quantity,
                    selected_options: line.selected_options,
                    reviewed: false,
                },
            );
        }

        trip(armed, Fault::DeliveryInsert)?;
        let delivery_id = self.allocate_id();
        self.deliveries.insert(
            delivery_id,
            Delivery {
                id: delivery_id,
                order_id,
                address: order.delivery_address,
                status: DeliveryStatus::Pending,
                delivered_at: None,
            },
        );

        self.view(order_id)?
            .ok_or_else(|| StoreError::not_found("Order", order_id))
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("in-memory store lock poisoned")
    }

    fn read<T>(&self, query: impl FnOnce(&Tables) -> T) -> T {
        query(&self.lock().tables)
    }

    /// Run `work` on a copy of the tables, keeping the copy only on success
    fn transact<T>(
        &self,
        work: impl FnOnce(&mut Tables, &mut Option<Fault>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut inner = self.lock();
        let Inner { tables, armed } = &mut *inner;

        let mut draft = tables.clone();
        let result = work(&mut draft, armed);
        if result.is_ok() {
            *tables = draft;
        }
        result
    }

    /// Make the next write reaching `fault` fail
    pub fn fail_on(&self, fault: Fault) {
        self.lock().armed = Some(fault);
    }

    pub fn insert_menu(&self, mut menu: MenuItem) -> MenuItem {
        let mut inner = self.lock();
        menu.id = inner.tables.allocate_id();
        inner.tables.menus.insert(menu.id, menu.clone());
        menu
    }

    pub fn insert_payment_option(&self, name: &str) -> PaymentOption {
        let mut inner = self.lock();
        let option = PaymentOption {
            id: inner.tables.allocate_id(),
            name: name.to_string(),
            description: format!("Pay with {}", name),
        };
        inner.tables.payment_options.insert(option.id, option.clone());
        option
    }

    pub fn insert_promotion(&self, name: &str, price: i64, expired_at: DateTime<Utc>) -> Promotion {
        let mut inner = self.lock();
        let promotion = Promotion {
            id: inner.tables.allocate_id(),
            name: name.to_string(),
            description: format!("{} bundle", name),
            price,
            expired_at,
        };
        inner.tables.promotions.insert(promotion.id, promotion.clone());
        promotion
    }

    pub fn insert_coupon(&self, issuer_id: i32, discount: i64) -> Coupon {
        self.lock()
            .tables
            .insert_coupon(&NewCoupon::new(issuer_id, "Test coupon", discount))
    }

    /// Set the user's stock of a coupon, creating the holding if needed
    pub fn give_holding(&self, coupon_id: i32, user_id: i32, stock: i32) {
        let mut inner = self.lock();
        if let Some(holding) = inner.tables.holding_mut(coupon_id, user_id) {
            holding.stock = stock;
            return;
        }
        let id = inner.tables.allocate_id();
        inner.tables.holdings.insert(
            id,
            CouponHolding {
                id,
                coupon_id,
                user_id,
                stock,
            },
        );
    }

    pub fn insert_player(&self, username: &str, games_attempt: i32) -> Player {
        let mut inner = self.lock();
        let player = Player {
            id: inner.tables.allocate_id(),
            username: username.to_string(),
            games_attempt,
        };
        inner.tables.players.insert(player.id, player.clone());
        player
    }

    /// Place a single-unit order of each menu, bypassing pricing
    pub fn place_fixture_order(&self, user_id: i32, menu_ids: &[i32]) -> OrderView {
        let lines = menu_ids
            .iter()
            .map(|&menu_id| NewOrderLine {
                menu_id,
                quantity: 1,
                selected_options: vec![],
            })
            .collect();

        let order = NewOrder {
            user_id,
            payment_option_id: 0,
            coupon_id: None,
            total_price: 0,
            ordered_menus: String::new(),
            lines,
            delivery_address: "Fixture Street 1".to_string(),
        };

        self.transact(|tables, armed| tables.place_order(armed, order))
            .expect("fixture order must reference existing menus")
    }

    pub fn holding(&self, coupon_id: i32, user_id: i32) -> Option<CouponHolding> {
        self.read(|t| {
            t.holdings
                .values()
                .find(|h| h.coupon_id == coupon_id && h.user_id == user_id)
                .cloned()
        })
    }

    pub fn menu(&self, id: i32) -> Option<MenuItem> {
        self.read(|t| t.menus.get(&id).cloned())
    }

    pub fn line(&self, id: i32) -> Option<OrderLine> {
        self.read(|t| t.lines.get(&id).cloned())
    }

    pub fn player(&self, id: i32) -> Option<Player> {
        self.read(|t| t.players.get(&id).cloned())
    }

    pub fn game(&self, id: i32) -> Option<Game> {
        self.read(|t| t.games.get(&id).cloned())
    }

    pub fn order_count(&self) -> usize {
        self.read(|t| t.orders.len())
    }

    pub fn review_count(&self) -> usize {
        self.read(|t| t.reviews.len())
    }

    pub fn coupon_count(&self) -> usize {
        self.read(|t| t.coupons.len())
    }

    pub fn game_count(&self) -> usize {
        self.read(|t| t.games.len())
    }
}

#[async_trait]
impl MenuRepository for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<MenuItem>> {
        Ok(self.menu(id))
    }
}

#[async_trait]
impl CouponRepository for InMemoryStore {
    async fn create(&self, draft: NewCoupon) -> StoreResult<Coupon> {
        Ok(self.lock().tables.insert_coupon(&draft))
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Coupon>> {
        Ok(self.read(|t| t.coupons.get(&id).cloned()))
    }

    async fn find_holding(&self, coupon_id: i32, user_id: i32) -> StoreResult<Option<CouponHolding>> {
        Ok(self.holding(coupon_id, user_id))
    }

    async fn list_all(&self) -> StoreResult<Vec<Coupon>> {
        Ok(self.read(|t| t.coupons.values().cloned().collect()))
    }

    async fn update(&self, id: i32, changes: CouponChanges) -> StoreResult<Coupon> {
        self.transact(|tables, _| {
            let coupon = tables
                .coupons
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("Coupon", id))?;
            coupon.description = changes.description;
            coupon.discount = changes.discount;
            coupon.availability = changes.availability;
            Ok(coupon.clone())
        })
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        self.transact(|tables, _| {
            tables
                .coupons
                .remove(&id)
                .ok_or_else(|| StoreError::not_found("Coupon", id))?;
            tables.holdings.retain(|_, h| h.coupon_id != id);
            for order in tables.orders.values_mut().filter(|o| o.coupon_id == Some(id)) {
                order.coupon_id = None;
            }
            for game in tables.games.values_mut().filter(|g| g.coupon_id == Some(id)) {
                game.coupon_id = None;
            }
            Ok(())
        })
    }

    async fn list_holdings_for_user(&self, user_id: i32) -> StoreResult<Vec<HeldCoupon>> {
        Ok(self.read(|t| {
            t.holdings
                .values()
                .filter(|h| h.user_id == user_id && h.stock > 0)
                .filter_map(|h| {
                    t.coupons.get(&h.coupon_id).map(|coupon| HeldCoupon {
                        holding_id: h.id,
                        stock: h.stock,
                        coupon: coupon.clone(),
                    })
                })
                .collect()
        }))
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn place_order(&self, order: NewOrder) -> StoreResult<OrderView> {
        self.transact(|tables, armed| tables.place_order(armed, order))
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<OrderView>> {
        self.read(|t| t.view(id))
    }
}

#[async_trait]
impl DeliveryRepository for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Delivery>> {
        Ok(self.read(|t| t.deliveries.get(&id).cloned()))
    }

    async fn update_status(
        &self,
        id: i32,
        status: DeliveryStatus,
        stamp: Option<DateTime<Utc>>,
    ) -> StoreResult<Delivery> {
        self.transact(|tables, _| {
            let delivery = tables
                .deliveries
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found("Delivery", id))?;

            delivery.status = status;
            if stamp.is_some() {
                delivery.delivered_at = stamp;
            }
            Ok(delivery.clone())
        })
    }
}

#[async_trait]
impl PaymentOptionRepository for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<PaymentOption>> {
        Ok(self.read(|t| t.payment_options.get(&id).cloned()))
    }
}

#[async_trait]
impl PromotionRepository for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Promotion>> {
        Ok(self.read(|t| t.promotions.get(&id).cloned()))
    }
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn find_target(&self, order_line_id: i32) -> StoreResult<Option<ReviewTarget>> {
        Ok(self.read(|t| {
            let line = t.lines.get(&order_line_id)?;
            let order = t.orders.get(&line.order_id)?;
            Some(ReviewTarget {
                order_line_id: line.id,
                order_id: line.order_id,
                menu_id: line.menu_id,
                reviewed: line.reviewed,
                owner_id: order.user_id,
            })
        }))
    }

    async fn submit_review(&self, new_review: NewReview) -> StoreResult<ReviewReceipt> {
        self.transact(|tables, armed| {
            let line = tables
                .lines
                .get_mut(&new_review.order_line_id)
                .filter(|line| !line.reviewed)
                .ok_or_else(|| {
                    StoreError::Conflict(format!(
                        "order line {} already reviewed",
                        new_review.order_line_id
                    ))
                })?;
            line.reviewed = true;

            let review = CustomerReview {
                id: tables.allocate_id(),
                order_line_id: new_review.order_line_id,
                user_id: new_review.user_id,
                menu_id: new_review.menu_id,
                review: new_review.review.clone(),
                rating: new_review.rating,
                created_at: Utc::now(),
            };
            tables.reviews.insert(review.id, review.clone());

            trip(armed, Fault::MenuRatingUpdate)?;
            let menu = tables
                .menus
                .get_mut(&new_review.menu_id)
                .ok_or_else(|| StoreError::not_found("Menu", new_review.menu_id))?;

            let (avg_rating, rating_count) =
                RatingCalculator::next_average(menu.avg_rating, menu.rating_count, new_review.rating);
            menu.avg_rating = avg_rating;
            menu.rating_count = rating_count;

            Ok(ReviewReceipt {
                review,
                menu_rating: MenuRating {
                    menu_id: new_review.menu_id,
                    avg_rating,
                    rating_count,
                },
            })
        })
    }

    async fn find_by_menu(&self, menu_id: i32) -> StoreResult<Vec<CustomerReview>> {
        let mut reviews: Vec<CustomerReview> = self.read(|t| {
            t.reviews
                .values()
                .filter(|review| review.menu_id == menu_id)
                .cloned()
                .collect()
        });
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }
}

#[async_trait]
impl PlayerRepository for InMemoryStore {
    async fn find_by_id(&self, user_id: i32) -> StoreResult<Option<Player>> {
        Ok(self.player(user_id))
    }

    async fn reset_game_attempts(&self, attempts: i32) -> StoreResult<u64> {
        self.transact(|tables, _| {
            let mut changed = 0;
            for player in tables.players.values_mut() {
                if player.games_attempt != attempts {
                    player.games_attempt = attempts;
                    changed += 1;
                }
            }
            Ok(changed)
        })
    }
}

#[async_trait]
impl GameRepository for InMemoryStore {
    async fn start_game(&self, user_id: i32, question: &TriviaQuestion) -> StoreResult<Game> {
        self.transact(|tables, _| {
            let player = tables
                .players
                .get_mut(&user_id)
                .filter(|player| player.games_attempt > 0)
                .ok_or_else(|| StoreError::Conflict(format!("user {} has no attempts left", user_id)))?;
            player.games_attempt -= 1;

            let game = Game {
                id: tables.allocate_id(),
                user_id,
                question: question.question.clone(),
                difficulty: question.difficulty,
                answer: question.correct_answer.clone(),
                score: None,
                coupon_id: None,
                created_at: Utc::now(),
            };
            tables.games.insert(game.id, game.clone());
            Ok(game)
        })
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Game>> {
        Ok(self.game(id))
    }

    async fn settle_wrong_answer(&self, game_id: i32) -> StoreResult<Game> {
        self.transact(|tables, _| {
            let game = tables
                .games
                .get_mut(&game_id)
                .filter(|game| game.score.is_none())
                .ok_or_else(|| StoreError::Conflict(format!("game {} already answered", game_id)))?;
            game.score = Some(0);
            Ok(game.clone())
        })
    }

    async fn settle_reward(
        &self,
        game_id: i32,
        user_id: i32,
        score: i64,
        coupon: NewCoupon,
    ) -> StoreResult<RewardReceipt> {
        self.transact(|tables, armed| {
            if !tables.games.get(&game_id).is_some_and(|game| game.score.is_none()) {
                return Err(StoreError::Conflict(format!("game {} already answered", game_id)));
            }

            let coupon = tables.insert_coupon(&coupon);
            let holding = tables.issue_or_increment(coupon.id, user_id);

            let game = tables
                .games
                .get_mut(&game_id)
                .ok_or_else(|| StoreError::not_found("Game", game_id))?;
            game.score = Some(score);
            game.coupon_id = Some(coupon.id);
            let game = game.clone();

            trip(armed, Fault::LeaderboardUpsert)?;
            let accumulated_score = tables.leaderboard.entry(user_id).or_insert(0);
            *accumulated_score += score;
            let standing = LeaderboardStanding {
                user_id,
                accumulated_score: *accumulated_score,
            };

            Ok(RewardReceipt {
                game,
                coupon,
                holding,
                standing,
            })
        })
    }

    async fn leaderboard(&self) -> StoreResult<Vec<LeaderboardEntry>> {
        let mut entries: Vec<LeaderboardEntry> = self.read(|t| {
            t.leaderboard
                .iter()
                .filter_map(|(&user_id, &accumulated_score)| {
                    t.players.get(&user_id).map(|player| LeaderboardEntry {
                        user_id,
                        username: player.username.clone(),
                        accumulated_score,
                    })
                })
                .collect()
        });
        entries.sort_by(|a, b| {
            b.accumulated_score
                .cmp(&a.accumulated_score)
                .then(a.user_id.cmp(&b.user_id))
        });
        Ok(entries)
    }
}

/// Trivia provider returning a fixed question, or failing every call
#[derive(Clone)]
pub struct FixedTriviaProvider {
    question: Option<TriviaQuestion>,
    calls: Arc<AtomicUsize>,
}

impl FixedTriviaProvider {
    pub fn new(question: TriviaQuestion) -> Self {
        Self {
            question: Some(question),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            question: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TriviaProvider for FixedTriviaProvider {
    async fn fetch_question(&self) -> Result<TriviaQuestion, TriviaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.question.clone().ok_or(TriviaError::Status(503))
    }
}

pub mod fixtures {
    use super::*;
    use crate::catalog::{OptionChoice, OptionGroup, SelectionType};
    use crate::games::Difficulty;

    fn cheese(checked: bool) -> OptionChoice {
        OptionChoice {
            name: "Cheese".to_string(),
            price: 5000,
            description: "Melted cheddar".to_string(),
            checked,
        }
    }

    fn extra_group(choices: Vec<OptionChoice>) -> OptionGroup {
        OptionGroup {
            title: "Extra".to_string(),
            selection_type: SelectionType::Multiple,
            max: 2,
            choices,
        }
    }

    /// Burger at 50000 with an "Extra" group of cheese and egg
    pub fn burger_menu() -> MenuItem {
        MenuItem {
            id: 0,
            name: "Burger".to_string(),
            description: "Beef burger".to_string(),
            price: 50000,
            options: vec![extra_group(vec![
                cheese(false),
                OptionChoice {
                    name: "Egg".to_string(),
                    price: 3000,
                    description: "Fried egg".to_string(),
                    checked: false,
                },
            ])],
            avg_rating: 0.0,
            rating_count: 0,
        }
    }

    /// Burger's "Extra" group holding only the cheese choice
    pub fn cheese_selection(checked: bool) -> Vec<OptionGroup> {
        vec![extra_group(vec![cheese(checked)])]
    }

    pub fn plain_menu(name: &str, price: i64) -> MenuItem {
        MenuItem {
            id: 0,
            name: name.to_string(),
            description: format!("{} without add-ons", name),
            price,
            options: vec![],
            avg_rating: 0.0,
            rating_count: 0,
        }
    }

    /// Question whose correct answer is "Mercury"
    pub fn question(difficulty: Difficulty) -> TriviaQuestion {
        TriviaQuestion {
            category: "Science".to_string(),
            question: "Which planet is closest to the sun?".to_string(),
            correct_answer: "Mercury".to_string(),
            incorrect_answers: vec!["Venus".to_string(), "Mars".to_string(), "Jupiter".to_string()],
            difficulty,
        }
    }
}
