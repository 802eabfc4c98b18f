//! Rules oracle over `shakmaty`.
//!
//! The session and the move pipeline only see the `RulesOracle` contract;
//! `Game` is the one implementation and owns the authoritative position.

use shakmaty::{fen::Fen, CastlingMode, Chess, EnPassantMode, File, Move, Position, Role, Square};
use thiserror::Error;

use crate::moves::{LegalMove, Side};

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Invalid FEN '{0}'")]
    InvalidFen(String),

    #[error("Illegal position: {0}")]
    IllegalPosition(String),
}

/// Authoritative board state as seen by the rest of the service.
pub trait RulesOracle {
    /// Serialized position (FEN).
    fn current_position(&self) -> String;

    /// Legal moves for the side to move, one entry per (from, to) pair.
    fn legal_moves(&self) -> Vec<LegalMove>;

    /// Play `from -> to` if legal. Returns the applied pair, or `None` and
    /// leaves the position untouched.
    fn apply_move(&mut self, from: Square, to: Square, promotion: Option<Role>)
        -> Option<LegalMove>;

    fn side_to_move(&self) -> Side;

    fn is_game_over(&self) -> bool;

    fn is_check(&self) -> bool;

    fn is_checkmate(&self) -> bool;
}

/// A game from some starting position plus the moves played on it.
#[derive(Debug, Clone, Default)]
pub struct Game {
    pos: Chess,
    history: Vec<LegalMove>,
}

impl Game {
    /// Standard starting position.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self, OracleError> {
        let parsed: Fen = fen
            .parse()
            .map_err(|_| OracleError::InvalidFen(fen.to_string()))?;
        let pos = parsed
            .into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| OracleError::IllegalPosition(e.to_string()))?;

        Ok(Self {
            pos,
            history: Vec::new(),
        })
    }

    /// Moves played so far, oldest first.
    pub fn history(&self) -> &[LegalMove] {
        &self.history
    }

    pub fn last_move(&self) -> Option<LegalMove> {
        self.history.last().copied()
    }

    /// Side that delivered mate, if the game ended in checkmate.
    pub fn winner(&self) -> Option<Side> {
        self.pos
            .is_checkmate()
            .then(|| Side::from(self.pos.turn()).opposite())
    }
}

/// Origin and destination squares of a move. Castling maps to the king's
/// destination (g- or c-file) rather than the rook square.
fn endpoints(m: &Move) -> Option<(Square, Square)> {
    match m {
        Move::Normal { from, to, .. } => Some((*from, *to)),
        Move::EnPassant { from, to } => Some((*from, *to)),
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            Some((*king, Square::from_coords(file, king.rank())))
        }
        _ => None,
    }
}

impl RulesOracle for Game {
    fn current_position(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    fn legal_moves(&self) -> Vec<LegalMove> {
        let mut moves: Vec<LegalMove> = Vec::new();
        for (from, to) in self.pos.legal_moves().iter().filter_map(endpoints) {
            // Promotions yield one shakmaty move per piece; keep one pair.
            let pair = LegalMove::new(from, to);
            if !moves.contains(&pair) {
                moves.push(pair);
            }
        }
        moves
    }

    fn apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Option<LegalMove> {
        let chosen = self.pos.legal_moves().into_iter().find(|m| {
            endpoints(m) == Some((from, to))
                && match m.promotion() {
                    None => true,
                    Some(role) => promotion == Some(role),
                }
        })?;

        self.pos.play_unchecked(chosen);
        let applied = LegalMove::new(from, to);
        self.history.push(applied);
        Some(applied)
    }

    fn side_to_move(&self) -> Side {
        Side::from(self.pos.turn())
    }

    fn is_game_over(&self) -> bool {
        self.pos.is_game_over()
    }

    fn is_check(&self) -> bool {
        self.pos.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.pos.is_checkmate()
    }
}
