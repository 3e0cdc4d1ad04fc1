// Trivia game module
// Attempts, grading, reward coupons and the leaderboard

pub mod error;
pub mod handlers;
pub mod models;
pub mod provider;
pub mod repository;
pub mod service;

pub use error::GameError;
pub use handlers::*;
pub use models::*;
pub use provider::{HttpTriviaProvider, TriviaError, TriviaProvider};
pub use repository::{GameRepository, PgGameRepository, PgPlayerRepository, PlayerRepository};
pub use service::GameService;
