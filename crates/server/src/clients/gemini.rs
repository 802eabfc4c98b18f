use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{check_status, http_client, CompletionClient, Prompt, ProviderError};
use crate::config::Config;

const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 8;

/// Primer reply placed after the instruction so the model sees the expected
/// shape once before the real position.
const PRIMER_REPLY: &str = "e2e4";

pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: http_client(config.llm_timeout()),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

/// generateContent payload: instruction, primer, then the position.
pub fn request_body(prompt: &Prompt) -> Value {
    json!({
        "contents": [
            { "role": "user", "parts": [{ "text": prompt.system }] },
            { "role": "model", "parts": [{ "text": PRIMER_REPLY }] },
            { "role": "user", "parts": [{ "text": prompt.user }] },
        ],
        "generationConfig": {
            "temperature": TEMPERATURE,
            "maxOutputTokens": MAX_OUTPUT_TOKENS,
        },
    })
}

/// Concatenated text parts of the first candidate.
pub fn extract_text(body: &Value) -> Option<String> {
    let parts = body["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &Prompt, credential: &str) -> Result<String, ProviderError> {
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", credential)
            .json(&request_body(prompt))
            .send()
            .await?;

        let data: Value = check_status(resp).await?.json().await?;

        extract_text(&data).ok_or_else(|| ProviderError::Envelope(data.to_string()))
    }
}
