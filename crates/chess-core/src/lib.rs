//! Chess vocabulary and rules adapter for the LLM opponent service.
//!
//! Rules, move generation and mate detection all come from `shakmaty`;
//! this crate only shapes them into the coordinate form the rest of the
//! workspace speaks.

pub mod game_state;
pub mod moves;
pub mod oracle;

pub use game_state::GameState;
pub use moves::{LegalMove, MoveProposal, ProposalError, Side, PROMOTION_ROLE};
pub use oracle::{Game, OracleError, RulesOracle};
