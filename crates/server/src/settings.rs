//! Session settings: opponent provider, API credentials, human colour.
//!
//! Held in memory for the life of the process and never persisted.

use std::collections::BTreeMap;
use std::fmt;

use chess_core::Side;
use serde::Serialize;

use crate::clients::Provider;

#[derive(Clone)]
pub struct Settings {
    selected_provider: Option<Provider>,
    credentials: BTreeMap<Provider, String>,
    player_color: Side,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// No provider selected, an empty credential for every provider, human
    /// plays white.
    pub fn new() -> Self {
        Self {
            selected_provider: None,
            credentials: Provider::ALL
                .iter()
                .map(|p| (*p, String::new()))
                .collect(),
            player_color: Side::White,
        }
    }

    /// Credentials entered earlier are kept.
    pub fn set_provider(&mut self, provider: Option<Provider>) {
        self.selected_provider = provider;
    }

    pub fn set_credential(&mut self, provider: Provider, value: impl Into<String>) {
        self.credentials.insert(provider, value.into());
    }

    /// Does not touch the game in progress.
    pub fn set_player_color(&mut self, color: Side) {
        self.player_color = color;
    }

    pub fn selected_provider(&self) -> Option<Provider> {
        self.selected_provider
    }

    pub fn credential(&self, provider: Provider) -> &str {
        self.credentials
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn player_color(&self) -> Side {
        self.player_color
    }

    pub fn view(&self) -> SettingsView {
        SettingsView {
            selected_provider: self.selected_provider,
            providers: Provider::ALL
                .iter()
                .map(|p| ProviderInfo {
                    id: *p,
                    name: p.display_name(),
                    credential_set: !self.credential(*p).is_empty(),
                })
                .collect(),
            player_color: self.player_color,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let configured: Vec<Provider> = self
            .credentials
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(p, _)| *p)
            .collect();
        f.debug_struct("Settings")
            .field("selected_provider", &self.selected_provider)
            .field("credentials_set", &configured)
            .field("player_color", &self.player_color)
            .finish()
    }
}

/// Settings as shown to the browser. Credentials are reduced to a flag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub selected_provider: Option<Provider>,
    pub providers: Vec<ProviderInfo>,
    pub player_color: Side,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: Provider,
    pub name: &'static str,
    pub credential_set: bool,
}
