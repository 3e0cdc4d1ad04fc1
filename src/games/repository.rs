use async_trait::async_trait;
use sqlx::PgPool;

use crate::coupons::repository::{insert_coupon, issue_or_increment_holding};
use crate::coupons::NewCoupon;
use crate::games::models::{Game, LeaderboardEntry, LeaderboardStanding, Player, RewardReceipt, TriviaQuestion};
use crate::store::{StoreError, StoreResult};

/// Read and reset the per-user game attempts
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn find_by_id(&self, user_id: i32) -> StoreResult<Option<Player>>;

    /// Restore every user's attempts, returning how many rows changed
    async fn reset_game_attempts(&self, attempts: i32) -> StoreResult<u64>;
}

/// Persistence port for games and the leaderboard
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Consume one attempt and record the game in the same transaction
    ///
    /// Returns `Conflict` when the user had no attempt left.
    async fn start_game(&self, user_id: i32, question: &TriviaQuestion) -> StoreResult<Game>;

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Game>>;

    /// Store a zero score; `Conflict` if the game was already answered
    async fn settle_wrong_answer(&self, game_id: i32) -> StoreResult<Game>;

    /// Mint the reward coupon, hand it to `user_id`, score the game and
    /// add the score to the leaderboard, all or nothing
    ///
    /// Returns `Conflict` if the game was already answered.
    async fn settle_reward(
        &self,
        game_id: i32,
        user_id: i32,
        score: i64,
        coupon: NewCoupon,
    ) -> StoreResult<RewardReceipt>;

    /// Leaderboard ordered by accumulated score, highest first
    async fn leaderboard(&self) -> StoreResult<Vec<LeaderboardEntry>>;
}

const GAME_COLUMNS: &str = "id, user_id, question, difficulty, answer, score, coupon_id, created_at";

#[derive(Clone)]
pub struct PgPlayerRepository {
    pool: PgPool,
}

impl PgPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerRepository for PgPlayerRepository {
    async fn find_by_id(&self, user_id: i32) -> StoreResult<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(
            "SELECT id, username, games_attempt FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    async fn reset_game_attempts(&self, attempts: i32) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE users SET games_attempt = $1 WHERE games_attempt <> $1")
            .bind(attempts)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Repository for game operations
#[derive(Clone)]
pub struct PgGameRepository {
    pool: PgPool,
}

impl PgGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GameRepository for PgGameRepository {
    async fn start_game(&self, user_id: i32, question: &TriviaQuestion) -> StoreResult<Game> {
        let mut tx = self.pool.begin().await?;

        let consumed = sqlx::query(
            "UPDATE users SET games_attempt = games_attempt - 1 WHERE id = $1 AND games_attempt > 0",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if consumed.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!("user {} has no attempts left", user_id)));
        }

        let game = sqlx::query_as::<_, Game>(&format!(
            r#"
            INSERT INTO games (user_id, question, difficulty, answer)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            GAME_COLUMNS
        ))
        .bind(user_id)
        .bind(&question.question)
        .bind(question.difficulty)
        .bind(&question.correct_answer)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(game)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Game>> {
        let game = sqlx::query_as::<_, Game>(&format!("SELECT {} FROM games WHERE id = $1", GAME_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(game)
    }

    async fn settle_wrong_answer(&self, game_id: i32) -> StoreResult<Game> {
        sqlx::query_as::<_, Game>(&format!(
            "UPDATE games SET score = 0 WHERE id = $1 AND score IS NULL RETURNING {}",
            GAME_COLUMNS
        ))
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::Conflict(format!("game {} already answered", game_id)))
    }

    async fn settle_reward(
        &self,
        game_id: i32,
        user_id: i32,
        score: i64,
        coupon: NewCoupon,
    ) -> StoreResult<RewardReceipt> {
        let mut tx = self.pool.begin().await?;

        let unanswered: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM games WHERE id = $1 AND score IS NULL FOR UPDATE",
        )
        .bind(game_id)
        .fetch_optional(&mut *tx)
        .await?;

        if unanswered.is_none() {
            return Err(StoreError::Conflict(format!("game {} already answered", game_id)));
        }

        let coupon = insert_coupon(&mut *tx, &coupon).await?;
        let holding = issue_or_increment_holding(&mut *tx, coupon.id, user_id).await?;

        let game = sqlx::query_as::<_, Game>(&format!(
            "UPDATE games SET score = $2, coupon_id = $3 WHERE id = $1 RETURNING {}",
            GAME_COLUMNS
        ))
        .bind(game_id)
        .bind(score)
        .bind(coupon.id)
        .fetch_one(&mut *tx)
        .await?;

        let standing = sqlx::query_as::<_, LeaderboardStanding>(
            r#"
            INSERT INTO game_leaderboards (user_id, accumulated_score)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET accumulated_score = game_leaderboards.accumulated_score + EXCLUDED.accumulated_score
            RETURNING user_id, accumulated_score
            "#,
        )
        .bind(user_id)
        .bind(score)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RewardReceipt {
            game,
            coupon,
            holding,
            standing,
        })
    }

    async fn leaderboard(&self) -> StoreResult<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT gl.user_id, u.username, gl.accumulated_score
            FROM game_leaderboards gl
            JOIN users u ON u.id = gl.user_id
            ORDER BY gl.accumulated_score DESC, gl.user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
