use axum::{extract::Path, Extension, Json};
use chess_core::Side;
use serde::Deserialize;

use crate::clients::Provider;
use crate::session::SharedSession;
use crate::settings::SettingsView;

#[derive(Deserialize)]
pub struct ProviderRequest {
    pub provider: Option<Provider>,
}

#[derive(Deserialize)]
pub struct CredentialRequest {
    pub value: String,
}

#[derive(Deserialize)]
pub struct PlayerColorRequest {
    pub color: Side,
}

/// GET /api/settings
pub async fn get_settings(Extension(session): Extension<SharedSession>) -> Json<SettingsView> {
    Json(session.settings().view())
}

/// PUT /api/settings/provider
/// `null` clears the selection.
pub async fn set_provider(
    Extension(session): Extension<SharedSession>,
    Json(req): Json<ProviderRequest>,
) -> Json<SettingsView> {
    let view = session.update_settings(|s| {
        s.set_provider(req.provider);
        s.view()
    });
    tracing::info!(provider = ?req.provider, "Opponent provider changed");
    Json(view)
}

/// PUT /api/settings/credentials/{provider}
pub async fn set_credential(
    Extension(session): Extension<SharedSession>,
    Path(provider): Path<Provider>,
    Json(req): Json<CredentialRequest>,
) -> Json<SettingsView> {
    let value = req.value.trim().to_string();
    Json(session.update_settings(|s| {
        s.set_credential(provider, value);
        s.view()
    }))
}

/// PUT /api/settings/player-color
/// The game in progress is left alone; start a new one to switch sides cleanly.
pub async fn set_player_color(
    Extension(session): Extension<SharedSession>,
    Json(req): Json<PlayerColorRequest>,
) -> Json<SettingsView> {
    Json(session.update_settings(|s| {
        s.set_player_color(req.color);
        s.view()
    }))
}
