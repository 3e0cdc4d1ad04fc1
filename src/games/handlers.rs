// HTTP handlers for game endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AdminUser, AuthenticatedUser};
use crate::error::ApiError;
use crate::games::{AnswerGameRequest, GameOutcome, GameStart, LeaderboardEntry};

/// Response DTO for the attempts reset
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetAttemptsResponse {
    pub users_updated: u64,
}

/// Handler for POST /api/games
/// Starts a game and returns the question with shuffled options
#[utoipa::path(
    post,
    path = "/api/games",
    responses(
        (status = 201, description = "Game started", body = GameStart),
        (status = 403, description = "No game attempts left"),
        (status = 500, description = "Trivia provider unavailable")
    ),
    tag = "games"
)]
pub async fn start_game_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
) -> Result<(StatusCode, Json<GameStart>), ApiError> {
    let (game, question) = state.games.start_game(user.user_id).await?;

    let options = question.shuffled_options(&mut rand::thread_rng());
    let response = GameStart {
        id: game.id,
        question: question.question,
        difficulty: game.difficulty,
        options,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for PUT /api/games/{id}
/// Submits the single answer of a game
#[utoipa::path(
    put,
    path = "/api/games/{id}",
    params(
        ("id" = i32, Path, description = "Game ID")
    ),
    request_body = AnswerGameRequest,
    responses(
        (status = 200, description = "Game graded", body = GameOutcome),
        (status = 404, description = "Game not found"),
        (status = 409, description = "Game already answered")
    ),
    tag = "games"
)]
pub async fn answer_game_handler(
    State(state): State<crate::AppState>,
    user: AuthenticatedUser,
    Path(game_id): Path<i32>,
    Json(request): Json<AnswerGameRequest>,
) -> Result<Json<GameOutcome>, ApiError> {
    let outcome = state
        .games
        .answer_game(user.user_id, game_id, &request.answer)
        .await?;

    Ok(Json(outcome))
}

/// Handler for GET /api/game-leaderboards
#[utoipa::path(
    get,
    path = "/api/game-leaderboards",
    responses(
        (status = 200, description = "Leaderboard, highest score first", body = Vec<LeaderboardEntry>)
    ),
    tag = "games"
)]
pub async fn leaderboard_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let entries = state.games.leaderboard().await?;
    Ok(Json(entries))
}

/// Handler for POST /api/reset-game
/// Restores every user's daily attempts (admin only)
#[utoipa::path(
    post,
    path = "/api/reset-game",
    responses(
        (status = 200, description = "Attempts restored", body = ResetAttemptsResponse),
        (status = 403, description = "Caller is not an admin")
    ),
    tag = "games"
)]
pub async fn reset_game_handler(
    State(state): State<crate::AppState>,
    _admin: AdminUser,
) -> Result<Json<ResetAttemptsResponse>, ApiError> {
    let users_updated = state.games.reset_attempts().await?;
    Ok(Json(ResetAttemptsResponse { users_updated }))
}
