use async_trait::async_trait;
use sqlx::PgPool;

use crate::reviews::{CustomerReview, MenuRating, NewReview, RatingCalculator, ReviewReceipt, ReviewTarget};
use crate::store::{StoreError, StoreResult};

/// Persistence port for customer reviews
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Order line with its review flag and the user who placed the order
    async fn find_target(&self, order_line_id: i32) -> StoreResult<Option<ReviewTarget>>;

    /// Record a review as one unit of work
    ///
    /// Inserts the review, flips the line's reviewed flag and folds the
    /// rating into the menu average. Returns `Conflict` when the line was
    /// already reviewed; nothing is written on any failure.
    async fn submit_review(&self, review: NewReview) -> StoreResult<ReviewReceipt>;

    async fn find_by_menu(&self, menu_id: i32) -> StoreResult<Vec<CustomerReview>>;
}

const REVIEW_COLUMNS: &str = "id, order_line_id, user_id, menu_id, review, rating, created_at";

/// Repository for database operations on reviews
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    /// Create a new PgReviewRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn find_target(&self, order_line_id: i32) -> StoreResult<Option<ReviewTarget>> {
        let target = sqlx::query_as::<_, ReviewTarget>(
            r#"
            SELECT ol.id AS order_line_id, ol.order_id, ol.menu_id, ol.reviewed, o.user_id AS owner_id
            FROM order_lines ol
            JOIN orders o ON o.id = ol.order_id
            WHERE ol.id = $1
            "#,
        )
        .bind(order_line_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(target)
    }

    async fn submit_review(&self, new_review: NewReview) -> StoreResult<ReviewReceipt> {
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            "UPDATE order_lines SET reviewed = TRUE WHERE id = $1 AND reviewed = FALSE",
        )
        .bind(new_review.order_line_id)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "order line {} already reviewed",
                new_review.order_line_id
            )));
        }

        let review = sqlx::query_as::<_, CustomerReview>(&format!(
            r#"
            INSERT INTO customer_reviews (order_line_id, user_id, menu_id, review, rating)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(new_review.order_line_id)
        .bind(new_review.user_id)
        .bind(new_review.menu_id)
        .bind(&new_review.review)
        .bind(new_review.rating)
        .fetch_one(&mut *tx)
        .await?;

        let (old_avg, old_count): (f64, i32) = sqlx::query_as(
            "SELECT avg_rating, rating_count FROM menus WHERE id = $1 FOR UPDATE",
        )
        .bind(new_review.menu_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found("Menu", new_review.menu_id))?;

        let (avg_rating, rating_count) =
            RatingCalculator::next_average(old_avg, old_count, new_review.rating);

        sqlx::query("UPDATE menus SET avg_rating = $1, rating_count = $2 WHERE id = $3")
            .bind(avg_rating)
            .bind(rating_count)
            .bind(new_review.menu_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ReviewReceipt {
            review,
            menu_rating: MenuRating {
                menu_id: new_review.menu_id,
                avg_rating,
                rating_count,
            },
        })
    }

    async fn find_by_menu(&self, menu_id: i32) -> StoreResult<Vec<CustomerReview>> {
        let reviews = sqlx::query_as::<_, CustomerReview>(&format!(
            "SELECT {} FROM customer_reviews WHERE menu_id = $1 ORDER BY created_at DESC, id DESC",
            REVIEW_COLUMNS
        ))
        .bind(menu_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
