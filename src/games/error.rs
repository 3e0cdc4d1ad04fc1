use crate::error::ApiError;
use crate::games::provider::TriviaError;
use crate::store::StoreError;

/// Error types for game operations
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Game with id {0} not found")]
    NotFound(i32),

    #[error("User with id {0} not found")]
    PlayerNotFound(i32),

    /// The user has used every attempt until the next reset
    #[error("User {0} has no game attempts left")]
    NoAttemptsLeft(i32),

    #[error("Game {0} has already been answered")]
    AlreadyAnswered(i32),

    #[error("Game {game_id} belongs to another user than {user_id}")]
    NotOwner { game_id: i32, user_id: i32 },

    #[error("Answer must not be empty")]
    EmptyAnswer,

    #[error(transparent)]
    Provider(#[from] TriviaError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        GameError::Store(err)
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::NotFound(id) => ApiError::not_found("Game", id),
            GameError::PlayerNotFound(id) => ApiError::not_found("User", id),
            GameError::NoAttemptsLeft(_) => ApiError::ResourceExhausted(err.to_string()),
            GameError::AlreadyAnswered(_) => ApiError::Conflict {
                message: err.to_string(),
            },
            GameError::NotOwner { .. } => ApiError::Forbidden(err.to_string()),
            GameError::EmptyAnswer => ApiError::Malformed(err.to_string()),
            GameError::Provider(e) => ApiError::InternalError(e.to_string()),
            GameError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}
