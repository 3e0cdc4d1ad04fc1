use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::coupons::{Coupon, CouponHolding};

/// Difficulty label copied from the trivia question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Points awarded for a correct answer
    pub fn score(&self) -> i64 {
        match self {
            Difficulty::Hard => 10000,
            Difficulty::Medium => 5000,
            Difficulty::Easy => 1000,
        }
    }
}

/// One question as returned by the trivia provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriviaQuestion {
    #[serde(default)]
    pub category: String,
    pub question: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
    pub difficulty: Difficulty,
}

impl TriviaQuestion {
    /// Correct answer and distractors in random order
    pub fn shuffled_options<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let mut options = Vec::with_capacity(self.incorrect_answers.len() + 1);
        options.push(self.correct_answer.clone());
        options.extend(self.incorrect_answers.iter().cloned());
        options.shuffle(rng);
        options
    }
}

/// One trivia round played by a user
///
/// `score` is `None` until answered; a wrong answer stores zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Game {
    pub id: i32,
    pub user_id: i32,
    pub question: String,
    pub difficulty: Difficulty,
    #[serde(skip_serializing, default)]
    pub answer: String,
    pub score: Option<i64>,
    pub coupon_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn is_answered(&self) -> bool {
        self.score.is_some()
    }
}

/// User fields the game cares about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Player {
    pub id: i32,
    pub username: String,
    pub games_attempt: i32,
}

/// Accumulated score of one user after a reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaderboardStanding {
    pub user_id: i32,
    pub accumulated_score: i64,
}

/// Leaderboard row as displayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaderboardEntry {
    pub user_id: i32,
    pub username: String,
    pub accumulated_score: i64,
}

/// Everything written by a correct answer
#[derive(Debug, Clone, PartialEq)]
pub struct RewardReceipt {
    pub game: Game,
    pub coupon: Coupon,
    pub holding: CouponHolding,
    pub standing: LeaderboardStanding,
}

/// Response DTO for a started game
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameStart {
    pub id: i32,
    pub question: String,
    pub difficulty: Difficulty,
    pub options: Vec<String>,
}

/// Request DTO for answering a game
///
/// Emptiness is checked by the service once the game is known to exist.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnswerGameRequest {
    pub answer: String,
}

/// Response DTO for an answered game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GameOutcome {
    pub game: Game,
    pub correct: bool,
    pub correct_answer: String,
    pub coupon: Option<Coupon>,
    pub accumulated_score: Option<i64>,
}
