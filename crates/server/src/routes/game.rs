use axum::{Extension, Json};
use chess_core::LegalMove;
use serde::Deserialize;

use crate::error::AppError;
use crate::session::{AiMoveOutcome, HumanMoveOutcome, SessionState, SharedSession};

#[derive(Deserialize)]
pub struct DropRequest {
    pub from: String,
    pub to: String,
}

/// GET /api/game
pub async fn get_state(Extension(session): Extension<SharedSession>) -> Json<SessionState> {
    Json(session.state())
}

/// GET /api/game/legal-moves
pub async fn get_legal_moves(Extension(session): Extension<SharedSession>) -> Json<Vec<LegalMove>> {
    Json(session.legal_moves())
}

/// POST /api/game/new
pub async fn new_game(
    Extension(session): Extension<SharedSession>,
) -> Result<Json<SessionState>, AppError> {
    Ok(Json(session.new_game()?))
}

/// POST /api/game/move
/// A declined drop is not an error: `accepted` is false and nothing changes.
pub async fn human_move(
    Extension(session): Extension<SharedSession>,
    Json(req): Json<DropRequest>,
) -> Json<HumanMoveOutcome> {
    Json(session.human_move(&req.from, &req.to))
}

/// POST /api/game/ai-move
/// `move` is null when the opponent produced nothing usable.
pub async fn ai_move(
    Extension(session): Extension<SharedSession>,
) -> Result<Json<AiMoveOutcome>, AppError> {
    Ok(Json(session.ai_move().await?))
}
