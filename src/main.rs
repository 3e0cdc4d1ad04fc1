pub mod auth;
pub mod catalog;
pub mod config;
pub mod coupons;
pub mod db;
pub mod error;
pub mod games;
pub mod orders;
pub mod reviews;
pub mod store;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::TokenService;
use catalog::{CatalogService, PgMenuRepository};
use config::AppConfig;
use coupons::{CouponLedger, PgCouponRepository};
use db::DbPool;
use games::{GameService, HttpTriviaProvider, PgGameRepository, PgPlayerRepository};
use orders::{
    DeliveryService, OrderService, PgDeliveryRepository, PgOrderRepository,
    PgPaymentOptionRepository, PgPromotionRepository,
};
use reviews::{PgReviewRepository, ReviewService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        orders::create_order_handler,
        orders::create_promotion_order_handler,
        orders::get_order_handler,
        orders::update_delivery_handler,
        orders::get_delivery_handler,
        reviews::create_review_handler,
        reviews::get_menu_reviews_handler,
        coupons::handlers::create_coupon_handler,
        coupons::handlers::list_coupons_handler,
        coupons::handlers::update_coupon_handler,
        coupons::handlers::delete_coupon_handler,
        coupons::handlers::list_user_coupons_handler,
        games::start_game_handler,
        games::answer_game_handler,
        games::leaderboard_handler,
        games::reset_game_handler,
    ),
    components(
        schemas(
            catalog::MenuItem, catalog::OptionGroup, catalog::OptionChoice, catalog::SelectionType,
            orders::Order, orders::OrderLine, orders::Delivery, orders::DeliveryStatus, orders::OrderView,
            orders::CreateOrderRequest, orders::OrderLineRequest, orders::UpdateDeliveryRequest,
            reviews::CustomerReview, reviews::CreateReviewRequest, reviews::MenuRating, reviews::ReviewReceipt,
            coupons::Coupon, coupons::HeldCoupon, coupons::CreateCouponRequest, coupons::UpdateCouponRequest,
            games::Difficulty, games::Game, games::GameStart, games::AnswerGameRequest, games::GameOutcome,
            games::LeaderboardEntry, games::ResetAttemptsResponse,
        )
    ),
    tags(
        (name = "orders", description = "Ordering, promotions and delivery status"),
        (name = "reviews", description = "Customer reviews and menu ratings"),
        (name = "coupons", description = "Coupon administration and holdings"),
        (name = "games", description = "Trivia reward game and leaderboard")
    ),
    info(
        title = "Food Order API",
        version = "1.0.0",
        description = "Ordering, coupon, review and trivia reward backend"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub coupons: CouponLedger,
    pub orders: OrderService,
    pub deliveries: DeliveryService,
    pub reviews: ReviewService,
    pub games: GameService,
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl AppState {
    /// Wire every service to its PostgreSQL repositories
    pub fn from_pool(pool: DbPool, config: &AppConfig) -> Result<Self, reqwest::Error> {
        let menus = Arc::new(PgMenuRepository::new(pool.clone()));
        let coupons = CouponLedger::new(Arc::new(PgCouponRepository::new(pool.clone())));
        let trivia = HttpTriviaProvider::new(&config.trivia_api_url, config.trivia_timeout)?;

        Ok(Self {
            tokens: Arc::new(TokenService::new(config.jwt_secret.clone())),
            orders: OrderService::new(
                Arc::new(PgOrderRepository::new(pool.clone())),
                Arc::new(PgPaymentOptionRepository::new(pool.clone())),
                Arc::new(PgPromotionRepository::new(pool.clone())),
                CatalogService::new(menus.clone()),
                coupons.clone(),
                config,
            ),
            coupons,
            deliveries: DeliveryService::new(Arc::new(PgDeliveryRepository::new(pool.clone()))),
            reviews: ReviewService::new(Arc::new(PgReviewRepository::new(pool.clone())), menus),
            games: GameService::new(
                Arc::new(PgPlayerRepository::new(pool.clone())),
                Arc::new(PgGameRepository::new(pool)),
                Arc::new(trivia),
                config,
            ),
        })
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Orders and deliveries
        .route("/api/orders", post(orders::create_order_handler))
        .route("/api/orders/:id", get(orders::get_order_handler))
        .route("/api/promotions/:id/orders", post(orders::create_promotion_order_handler))
        .route(
            "/api/deliveries/:id",
            get(orders::get_delivery_handler).put(orders::update_delivery_handler),
        )
        // Reviews
        .route("/api/customer-reviews", post(reviews::create_review_handler))
        .route("/api/menus/:id/reviews", get(reviews::get_menu_reviews_handler))
        // Coupons
        .route(
            "/api/coupons",
            get(coupons::handlers::list_coupons_handler).post(coupons::handlers::create_coupon_handler),
        )
        .route(
            "/api/coupons/:id",
            put(coupons::handlers::update_coupon_handler)
                .delete(coupons::handlers::delete_coupon_handler),
        )
        .route("/api/user-coupons", get(coupons::handlers::list_user_coupons_handler))
        // Games
        .route("/api/games", post(games::start_game_handler))
        .route("/api/games/:id", put(games::answer_game_handler))
        .route("/api/game-leaderboards", get(games::leaderboard_handler))
        .route("/api/reset-game", post(games::reset_game_handler))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Food Order API - Starting...");

    let config = AppConfig::from_env().expect("Invalid configuration");

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let state = AppState::from_pool(db_pool, &config).expect("Failed to build trivia client");
    let app = create_router(state);

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Food Order API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
