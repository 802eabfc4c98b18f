//! One game against the LLM opponent: board, settings and the AI turn.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chess_core::moves::parse_square;
use chess_core::{Game, GameState, LegalMove, MoveProposal, RulesOracle, Side, PROMOTION_ROLE};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::pipeline::{MovePipeline, MoveRequest};
use crate::settings::Settings;

pub type SharedSession = Arc<GameSession>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(flatten)]
    pub game: GameState,
    pub thinking: bool,
    pub player_color: Side,
    /// Display name of the selected opponent.
    pub opponent: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct HumanMoveOutcome {
    pub accepted: bool,
    pub state: SessionState,
}

#[derive(Debug, Serialize)]
pub struct AiMoveOutcome {
    #[serde(rename = "move")]
    pub mv: Option<String>,
    pub state: SessionState,
}

/// Clears the in-flight flag when the AI turn ends, however it ends.
struct ThinkingGuard<'a>(&'a AtomicBool);

impl Drop for ThinkingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Board locks are never held across the provider call; at most one AI
/// turn is outstanding at a time.
///
/// The in-flight flag is raised before the opponent snapshots the board, and
/// drops and resets read it while holding the board lock, so nothing else
/// can move the position between that snapshot and the reply.
pub struct GameSession {
    game: Mutex<Game>,
    settings: Mutex<Settings>,
    pipeline: MovePipeline,
    thinking: AtomicBool,
}

impl GameSession {
    pub fn new(pipeline: MovePipeline) -> Self {
        Self::with_game(pipeline, Game::new())
    }

    /// Session starting from an arbitrary position.
    pub fn with_game(pipeline: MovePipeline, game: Game) -> Self {
        Self {
            game: Mutex::new(game),
            settings: Mutex::new(Settings::new()),
            pipeline,
            thinking: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> Settings {
        lock(&self.settings).clone()
    }

    pub fn update_settings<R>(&self, f: impl FnOnce(&mut Settings) -> R) -> R {
        f(&mut lock(&self.settings))
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SessionState {
        let (player_color, opponent) = {
            let settings = lock(&self.settings);
            (
                settings.player_color(),
                settings.selected_provider().map(|p| p.display_name()),
            )
        };

        SessionState {
            game: GameState::capture(&lock(&self.game)),
            thinking: self.is_thinking(),
            player_color,
            opponent,
        }
    }

    pub fn legal_moves(&self) -> Vec<LegalMove> {
        lock(&self.game).legal_moves()
    }

    /// Back to the starting position. Settings stay as they are.
    pub fn new_game(&self) -> Result<SessionState, AppError> {
        {
            let mut game = lock(&self.game);
            if self.is_thinking() {
                return Err(AppError::Conflict(
                    "Opponent is still thinking".to_string(),
                ));
            }
            *game = Game::new();
        }
        info!("New game started");
        Ok(self.state())
    }

    /// A piece dropped by the human. Anything not playable right now is
    /// declined without touching the board.
    pub fn human_move(&self, from: &str, to: &str) -> HumanMoveOutcome {
        let accepted = self.try_human_move(from, to);
        HumanMoveOutcome {
            accepted,
            state: self.state(),
        }
    }

    fn try_human_move(&self, from: &str, to: &str) -> bool {
        let (Some(from), Some(to)) = (parse_square(from), parse_square(to)) else {
            return false;
        };

        let human = lock(&self.settings).player_color();
        let mut game = lock(&self.game);
        if self.is_thinking() {
            debug!("Drop declined: opponent is thinking");
            return false;
        }
        if game.is_game_over() || game.side_to_move() != human {
            return false;
        }

        game.apply_move(from, to, Some(PROMOTION_ROLE)).is_some()
    }

    /// Let the opponent play one move.
    ///
    /// Returns the applied move, or `None` when the opponent produced nothing
    /// usable; the turn then stays with the opponent.
    pub async fn ai_move(&self) -> Result<AiMoveOutcome, AppError> {
        let guard = self.begin_thinking()?;

        let human = lock(&self.settings).player_color();
        let request = {
            let game = lock(&self.game);
            if game.is_game_over() {
                return Err(AppError::BadRequest("Game is over".to_string()));
            }
            if game.side_to_move() == human {
                return Err(AppError::BadRequest("It is the player's turn".to_string()));
            }
            MoveRequest::from_oracle(&*game)
        };

        let (provider, credential) = {
            let settings = lock(&self.settings);
            let provider = settings.selected_provider();
            let credential = provider
                .map(|p| settings.credential(p).to_string())
                .unwrap_or_default();
            (provider, credential)
        };

        let proposed = self
            .pipeline
            .propose_move(&request, provider, &credential)
            .await;

        let applied = proposed.and_then(|text| self.apply_opponent_move(&request, &text));

        drop(guard);
        Ok(AiMoveOutcome {
            mv: applied,
            state: self.state(),
        })
    }

    fn begin_thinking(&self) -> Result<ThinkingGuard<'_>, AppError> {
        self.thinking
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::Conflict("Opponent is already thinking".to_string()))?;
        Ok(ThinkingGuard(&self.thinking))
    }

    fn apply_opponent_move(&self, request: &MoveRequest, text: &str) -> Option<String> {
        let mv = MoveProposal::parse(text).ok()?.as_legal_move();

        let mut game = lock(&self.game);
        if game.current_position() != request.position {
            warn!(mv = text, "Position changed while the opponent was thinking; reply dropped");
            return None;
        }

        game.apply_move(mv.from, mv.to, Some(PROMOTION_ROLE))
            .map(|m| m.to_string())
    }
}
