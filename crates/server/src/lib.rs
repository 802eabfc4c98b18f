pub mod clients;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod session;
pub mod settings;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::session::SharedSession;

/// The JSON API consumed by the browser board.
pub fn router(session: SharedSession) -> Router {
    // The board page is served from elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/health", get(routes::health::health_check))
        // Settings
        .route("/api/settings", get(routes::settings::get_settings))
        .route("/api/settings/provider", put(routes::settings::set_provider))
        .route(
            "/api/settings/credentials/{provider}",
            put(routes::settings::set_credential),
        )
        .route("/api/settings/player-color", put(routes::settings::set_player_color))
        // Game
        .route("/api/game", get(routes::game::get_state))
        .route("/api/game/legal-moves", get(routes::game::get_legal_moves))
        .route("/api/game/new", post(routes::game::new_game))
        .route("/api/game/move", post(routes::game::human_move))
        .route("/api/game/ai-move", post(routes::game::ai_move))
        .layer(Extension(session))
        .layer(cors)
}
