//! LLM provider adapters.
//!
//! Each vendor is one `CompletionClient`: send the fixed instruction plus the
//! position prompt, get back the raw reply text. `ProviderRegistry` maps the
//! closed `Provider` set onto those clients.

pub mod gemini;
pub mod openai;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    #[serde(alias = "openai")]
    Gpt,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Gemini, Provider::Gpt];

    pub fn id(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Gpt => "gpt",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Gemini => "Google Gemini",
            Provider::Gpt => "OpenAI GPT",
        }
    }
}

/// Instruction pair handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response carried no text: {0}")]
    Envelope(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// One round trip to the vendor. Returns the reply text as sent.
    async fn complete(&self, prompt: &Prompt, credential: &str) -> Result<String, ProviderError>;
}

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    clients: HashMap<Provider, Arc<dyn CompletionClient>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the live vendor adapters.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with(Provider::Gemini, gemini::GeminiClient::new(config))
            .with(Provider::Gpt, openai::OpenAiClient::new(config))
    }

    pub fn with(mut self, provider: Provider, client: impl CompletionClient + 'static) -> Self {
        self.clients.insert(provider, Arc::new(client));
        self
    }

    pub fn get(&self, provider: Provider) -> Option<&Arc<dyn CompletionClient>> {
        self.clients.get(&provider)
    }
}

fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent("LlmChess/1.0")
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {e}");
            Client::new()
        })
}

/// Turn a non-2xx response into `ProviderError::Status`, keeping a short
/// slice of the body for the log.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_wire_names() {
        assert_eq!(serde_json::to_string(&Provider::Gpt).unwrap(), "\"gpt\"");
        let p: Provider = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(p, Provider::Gpt);
        let p: Provider = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(p.display_name(), "Google Gemini");
        assert!(serde_json::from_str::<Provider>("\"claude\"").is_err());
    }

    #[test]
    fn test_registry_from_config_covers_every_provider() {
        let registry = ProviderRegistry::from_config(&Config::default());
        for provider in Provider::ALL {
            assert!(registry.get(provider).is_some(), "{} missing", provider.id());
        }
        assert!(ProviderRegistry::new().get(Provider::Gemini).is_none());
    }
}
