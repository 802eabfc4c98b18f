use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{check_status, http_client, CompletionClient, Prompt, ProviderError};
use crate::config::Config;

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 10;

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: http_client(config.llm_timeout()),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Chat completion payload for the configured model.
    pub fn request_body(&self, prompt: &Prompt) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        })
    }
}

/// `choices[0].message.content`, if present.
pub fn extract_text(body: &Value) -> Option<String> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.to_string())
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &Prompt, credential: &str) -> Result<String, ProviderError> {
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let data: Value = check_status(resp).await?.json().await?;

        extract_text(&data).ok_or_else(|| ProviderError::Envelope(data.to_string()))
    }
}
