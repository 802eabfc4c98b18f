//! Move-proposal pipeline: position in, validated legal move (or nothing) out.
//!
//! Every failure along the way (nothing configured, vendor error, a reply
//! that is not a bare coordinate move, or a move that is not legal) is logged
//! and collapses to `None`. An unusable reply leaves the turn with the
//! opponent; it never reaches the caller as an error.

use chess_core::{LegalMove, MoveProposal, ProposalError, RulesOracle, Side};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clients::{Prompt, Provider, ProviderError, ProviderRegistry};

pub const SYSTEM_PROMPT: &str = "You are a chess engine. Given a chess position in FEN notation, \
suggest the best move for the current player. You must respond with EXACTLY four characters: \
the source square followed by the target square, in the format 'e2e4' or 'g8f6'. \
No other text or explanation is allowed.";

/// Everything the opponent needs to pick a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub position: String,
    pub legal_moves: Vec<LegalMove>,
    pub side_to_move: Side,
}

impl MoveRequest {
    pub fn from_oracle<O: RulesOracle + ?Sized>(oracle: &O) -> Self {
        Self {
            position: oracle.current_position(),
            legal_moves: oracle.legal_moves(),
            side_to_move: oracle.side_to_move(),
        }
    }
}

/// Why a turn produced no move.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("no provider selected")]
    NoProvider,

    #[error("no credential set for {0:?}")]
    MissingCredential(Provider),

    #[error("no client registered for {0:?}")]
    Unregistered(Provider),

    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Proposal(#[from] ProposalError),
}

pub fn build_prompt(request: &MoveRequest) -> Prompt {
    let moves = request
        .legal_moves
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: format!(
            "Current position FEN: {}\nAvailable legal moves: {}\nProvide the best move for {} in the format 'e2e4'.",
            request.position,
            moves,
            request.side_to_move.name()
        ),
    }
}

/// Trim the raw reply, then require a bare coordinate move that appears in
/// `legal_moves`.
pub fn validate_reply(raw: &str, legal_moves: &[LegalMove]) -> Result<MoveProposal, ProposalError> {
    MoveProposal::parse(raw.trim())?.ensure_legal(legal_moves)
}

#[derive(Clone)]
pub struct MovePipeline {
    registry: ProviderRegistry,
}

impl MovePipeline {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Ask `provider` for a move. Returns the four-character move on success.
    pub async fn propose_move(
        &self,
        request: &MoveRequest,
        provider: Option<Provider>,
        credential: &str,
    ) -> Option<String> {
        match self.try_propose(request, provider, credential).await {
            Ok(proposal) => {
                info!(provider = ?provider, mv = proposal.as_str(), "Opponent move accepted");
                Some(proposal.into_string())
            }
            Err(rejection) => {
                warn!(provider = ?provider, "No opponent move: {rejection}");
                None
            }
        }
    }

    async fn try_propose(
        &self,
        request: &MoveRequest,
        provider: Option<Provider>,
        credential: &str,
    ) -> Result<MoveProposal, Rejection> {
        let provider = provider.ok_or(Rejection::NoProvider)?;
        if credential.is_empty() {
            return Err(Rejection::MissingCredential(provider));
        }
        let client = self
            .registry
            .get(provider)
            .ok_or(Rejection::Unregistered(provider))?;

        let prompt = build_prompt(request);
        debug!(
            provider = provider.id(),
            legal_moves = request.legal_moves.len(),
            "Requesting opponent move"
        );

        let raw = client.complete(&prompt, credential).await?;
        Ok(validate_reply(&raw, &request.legal_moves)?)
    }
}
