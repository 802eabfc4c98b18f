//! Coordinate move notation: sides, legal moves and LLM move proposals.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use shakmaty::{Color, Role, Square};
use thiserror::Error;

/// Promotion piece used for every promoting move. There is no promotion
/// picker, so a pawn reaching the last rank always becomes a queen.
pub const PROMOTION_ROLE: Role = Role::Queen;

static COORDINATE_MOVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-h][1-8][a-h][1-8]$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProposalError {
    #[error("Malformed move reply: {0:?}")]
    Malformed(String),

    #[error("Move {0} is not legal in this position")]
    Illegal(String),
}

/// One side of the board. Serialized as `"w"` / `"b"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[default]
    #[serde(rename = "w", alias = "white")]
    White,
    #[serde(rename = "b", alias = "black")]
    Black,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Lowercase name as used in prompts ("white", "black").
    pub fn name(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

/// An (origin, destination) pair permitted for the side to move.
///
/// Castling is expressed by the king's own squares (`e1g1`), never by the
/// rook square, so it lines up with the coordinate form the opponent sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
}

impl LegalMove {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// `"e2-e4"` form shown as the last move.
    pub fn dashed(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

impl fmt::Display for LegalMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl Serialize for LegalMove {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// True if `text` is exactly `[a-h][1-8][a-h][1-8]`. No trimming is done.
pub fn is_coordinate_move(text: &str) -> bool {
    COORDINATE_MOVE_RE.is_match(text)
}

/// Parse a single square name such as `"e4"`.
pub fn parse_square(text: &str) -> Option<Square> {
    if text.len() != 2 {
        return None;
    }
    text.parse::<Square>().ok()
}

/// A candidate move reply, already known to be two valid squares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveProposal {
    text: String,
    from: Square,
    to: Square,
}

impl MoveProposal {
    /// Accepts only the bare four-character coordinate form.
    pub fn parse(reply: &str) -> Result<Self, ProposalError> {
        if !is_coordinate_move(reply) {
            return Err(ProposalError::Malformed(reply.to_string()));
        }

        let from = parse_square(&reply[0..2])
            .ok_or_else(|| ProposalError::Malformed(reply.to_string()))?;
        let to = parse_square(&reply[2..4])
            .ok_or_else(|| ProposalError::Malformed(reply.to_string()))?;

        Ok(Self {
            text: reply.to_string(),
            from,
            to,
        })
    }

    /// Keep the proposal only if its squares match one of `legal_moves`.
    /// Promotion is not part of the comparison.
    pub fn ensure_legal(self, legal_moves: &[LegalMove]) -> Result<Self, ProposalError> {
        let candidate = self.as_legal_move();
        if legal_moves.contains(&candidate) {
            Ok(self)
        } else {
            Err(ProposalError::Illegal(self.text))
        }
    }

    pub fn as_legal_move(&self) -> LegalMove {
        LegalMove::new(self.from, self.to)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}
