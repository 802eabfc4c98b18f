//! Provider adapters against a local stand-in for the vendor APIs.

mod common;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use server::clients::gemini::GeminiClient;
use server::clients::openai::OpenAiClient;
use server::clients::{CompletionClient, Prompt, Provider, ProviderError, ProviderRegistry};
use server::config::Config;

const GOOD_KEY: &str = "sk-good";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
}

async fn openai_stub(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if header(&headers, "authorization") != format!("Bearer {GOOD_KEY}") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "Incorrect API key provided" } })),
        )
            .into_response();
    }
    Json(json!({
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": " e7e5 " },
        }],
        "usage": { "completion_tokens": body["max_tokens"] },
    }))
    .into_response()
}

async fn gemini_stub(Path(rest): Path<String>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if header(&headers, "x-goog-api-key") != GOOD_KEY {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": { "message": "API key not valid" } })),
        )
            .into_response();
    }
    if rest != "gemini-test:generateContent" {
        return StatusCode::NOT_FOUND.into_response();
    }
    if body["contents"][2]["parts"][0]["text"].as_str().is_none() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "g8f6" }] },
            "finishReason": "STOP",
        }],
    }))
    .into_response()
}

/// Serve both vendor stubs and return a config pointing at them.
async fn stub_config() -> Config {
    let router = Router::new()
        .route("/v1/chat/completions", post(openai_stub))
        .route("/v1beta/models/{*rest}", post(gemini_stub));
    let base_url = common::serve(router).await;

    Config {
        gemini_base_url: base_url.clone(),
        gemini_model: "gemini-test".to_string(),
        openai_base_url: base_url,
        llm_timeout_secs: 5,
        ..Config::default()
    }
}

fn prompt() -> Prompt {
    Prompt {
        system: "system".to_string(),
        user: "user".to_string(),
    }
}

#[tokio::test]
async fn openai_reply_is_extracted() {
    let client = OpenAiClient::new(&stub_config().await);
    let text = client.complete(&prompt(), GOOD_KEY).await.unwrap();
    assert_eq!(text, " e7e5 ");
}

#[tokio::test]
async fn openai_bad_key_is_a_status_error() {
    let client = OpenAiClient::new(&stub_config().await);
    match client.complete(&prompt(), "sk-bad").await {
        Err(ProviderError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Incorrect API key"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn gemini_reply_is_extracted() {
    let client = GeminiClient::new(&stub_config().await);
    let text = client.complete(&prompt(), GOOD_KEY).await.unwrap();
    assert_eq!(text, "g8f6");
}

#[tokio::test]
async fn gemini_bad_key_is_a_status_error() {
    let client = GeminiClient::new(&stub_config().await);
    assert!(matches!(
        client.complete(&prompt(), "nope").await,
        Err(ProviderError::Status { status: 403, .. })
    ));
}

#[tokio::test]
async fn unreachable_vendor_is_a_request_error() {
    let config = Config {
        openai_base_url: "http://127.0.0.1:9".to_string(),
        llm_timeout_secs: 2,
        ..Config::default()
    };
    let client = OpenAiClient::new(&config);
    assert!(matches!(
        client.complete(&prompt(), GOOD_KEY).await,
        Err(ProviderError::Request(_))
    ));
}

/// Full turn through the live adapter: human e2e4, GPT stub answers e7e5.
#[tokio::test]
async fn full_turn_through_openai_adapter() {
    let config = stub_config().await;
    let app = common::spawn_app(ProviderRegistry::from_config(&config)).await;
    let client = common::client();

    client
        .put(app.url("/api/settings/provider"))
        .json(&json!({ "provider": "gpt" }))
        .send()
        .await
        .unwrap();
    client
        .put(app.url("/api/settings/credentials/gpt"))
        .json(&json!({ "value": GOOD_KEY }))
        .send()
        .await
        .unwrap();

    let moved: Value = client
        .post(app.url("/api/game/move"))
        .json(&json!({ "from": "e2", "to": "e4" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(moved["accepted"], true);

    let body: Value = client
        .post(app.url("/api/game/ai-move"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["move"], "e7e5");
    assert_eq!(body["state"]["turn"], "w");

    // Switching to Gemini with a bad key: no move, turn unchanged
    app.session.update_settings(|s| {
        s.set_provider(Some(Provider::Gemini));
        s.set_credential(Provider::Gemini, "wrong");
    });
    assert_eq!(
        client
            .post(app.url("/api/game/move"))
            .json(&json!({ "from": "d2", "to": "d4" }))
            .send()
            .await
            .unwrap()
            .json::<Value>()
            .await
            .unwrap()["accepted"],
        true
    );
    let body: Value = client
        .post(app.url("/api/game/ai-move"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["move"].is_null());
    assert_eq!(body["state"]["turn"], "b");
}
