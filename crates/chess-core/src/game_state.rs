use serde::Serialize;

use crate::moves::Side;
use crate::oracle::{Game, RulesOracle};

/// Render-ready snapshot of a game, rebuilt after every applied move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub fen: String,
    pub last_move: Option<String>, // "e2-e4"
    pub game_over: bool,
    pub turn: Side,
    pub in_check: bool,
    pub winner: Option<Side>,
    pub history: Vec<String>, // UCI, oldest first
}

impl GameState {
    pub fn capture(game: &Game) -> Self {
        Self {
            fen: game.current_position(),
            last_move: game.last_move().map(|m| m.dashed()),
            game_over: game.is_game_over(),
            turn: game.side_to_move(),
            in_check: game.is_check(),
            winner: game.winner(),
            history: game.history().iter().map(|m| m.to_string()).collect(),
        }
    }
}
