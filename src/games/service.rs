use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::coupons::NewCoupon;
use crate::games::{
    error::GameError,
    models::{Game, GameOutcome, LeaderboardEntry, TriviaQuestion},
    provider::TriviaProvider,
    repository::{GameRepository, PlayerRepository},
};
use crate::store::StoreError;

/// Game session and reward service
#[derive(Clone)]
pub struct GameService {
    players: Arc<dyn PlayerRepository>,
    games: Arc<dyn GameRepository>,
    trivia: Arc<dyn TriviaProvider>,
    daily_game_attempts: i32,
    enforce_game_ownership: bool,
}

impl GameService {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        games: Arc<dyn GameRepository>,
        trivia: Arc<dyn TriviaProvider>,
        config: &AppConfig,
    ) -> Self {
        Self {
            players,
            games,
            trivia,
            daily_game_attempts: config.daily_game_attempts,
            enforce_game_ownership: config.enforce_game_ownership,
        }
    }

    /// Start a game for the user
    ///
    /// Consumes one attempt and records the fetched question's correct answer
    /// and difficulty. A user with no attempts left gets `NoAttemptsLeft`
    /// before the provider is called.
    pub async fn start_game(&self, user_id: i32) -> Result<(Game, TriviaQuestion), GameError> {
        let player = self
            .players
            .find_by_id(user_id)
            .await?
            .ok_or(GameError::PlayerNotFound(user_id))?;

        if player.games_attempt <= 0 {
            debug!("User {} has no game attempts left", user_id);
            return Err(GameError::NoAttemptsLeft(user_id));
        }

        let question = self.trivia.fetch_question().await.map_err(|e| {
            warn!("Trivia fetch failed for user {}: {}", user_id, e);
            GameError::Provider(e)
        })?;

        let game = self
            .games
            .start_game(user_id, &question)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => GameError::NoAttemptsLeft(user_id),
                other => GameError::Store(other),
            })?;

        info!(
            "Game {} started by user {} ({:?}), {} attempt(s) left",
            game.id,
            user_id,
            game.difficulty,
            player.games_attempt - 1
        );
        Ok((game, question))
    }

    /// Grade the single answer of a game
    ///
    /// A wrong answer stores a zero score. A correct one mints a reward
    /// coupon worth the difficulty score, hands it to the game's player and
    /// adds the score to their leaderboard row. Either way the game is
    /// answered exactly once; later calls get `AlreadyAnswered`.
    pub async fn answer_game(
        &self,
        user_id: i32,
        game_id: i32,
        answer: &str,
    ) -> Result<GameOutcome, GameError> {
        let game = self
            .games
            .find_by_id(game_id)
            .await?
            .ok_or(GameError::NotFound(game_id))?;

        if game.is_answered() {
            debug!("Game {} already answered", game_id);
            return Err(GameError::AlreadyAnswered(game_id));
        }

        if game.user_id != user_id {
            if self.enforce_game_ownership {
                warn!("User {} tried to answer game {} of user {}", user_id, game_id, game.user_id);
                return Err(GameError::NotOwner { game_id, user_id });
            }
            warn!(
                "User {} is answering game {} owned by user {}",
                user_id, game_id, game.user_id
            );
        }

        if answer.is_empty() {
            return Err(GameError::EmptyAnswer);
        }

        let already_answered = |e: StoreError| match e {
            StoreError::Conflict(_) => GameError::AlreadyAnswered(game_id),
            other => GameError::Store(other),
        };

        if answer != game.answer {
            let settled = self
                .games
                .settle_wrong_answer(game_id)
                .await
                .map_err(already_answered)?;

            info!("Game {} answered incorrectly", game_id);
            return Ok(GameOutcome {
                correct_answer: settled.answer.clone(),
                game: settled,
                correct: false,
                coupon: None,
                accumulated_score: None,
            });
        }

        let score = game.difficulty.score();
        let receipt = self
            .games
            .settle_reward(game_id, game.user_id, score, NewCoupon::game_prize(game.user_id, score))
            .await
            .map_err(already_answered)?;

        info!(
            "Game {} answered correctly: user {} won coupon {} worth {}, total score {}",
            game_id,
            game.user_id,
            receipt.coupon.id,
            score,
            receipt.standing.accumulated_score
        );
        Ok(GameOutcome {
            correct_answer: receipt.game.answer.clone(),
            game: receipt.game,
            correct: true,
            coupon: Some(receipt.coupon),
            accumulated_score: Some(receipt.standing.accumulated_score),
        })
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, GameError> {
        Ok(self.games.leaderboard().await?)
    }

    /// Restore every user's attempts to the configured daily amount
    pub async fn reset_attempts(&self) -> Result<u64, GameError> {
        let changed = self
            .players
            .reset_game_attempts(self.daily_game_attempts)
            .await?;

        info!(
            "Reset game attempts to {} for {} user(s)",
            self.daily_game_attempts, changed
        );
        Ok(changed)
    }
}
