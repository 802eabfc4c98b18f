#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chess_core::Game;
use reqwest::Client;
use server::clients::{CompletionClient, Prompt, ProviderError, ProviderRegistry};
use server::pipeline::MovePipeline;
use server::session::{GameSession, SharedSession};

/// A server running in-process on an ephemeral port.
pub struct TestApp {
    pub base_url: String,
    pub session: SharedSession,
}

impl TestApp {
    /// Build a URL for an API endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}

/// Serve `router` on 127.0.0.1 and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server error");
    });
    format!("http://{addr}")
}

/// Start the full API with the given provider adapters.
pub async fn spawn_app(registry: ProviderRegistry) -> TestApp {
    spawn_app_with_game(registry, Game::new()).await
}

/// Same as `spawn_app`, but the board starts from `game`.
pub async fn spawn_app_with_game(registry: ProviderRegistry, game: Game) -> TestApp {
    let session: SharedSession = Arc::new(GameSession::with_game(MovePipeline::new(registry), game));
    let base_url = serve(server::router(session.clone())).await;
    TestApp { base_url, session }
}

/// Provider adapter that replays queued replies and counts calls.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(replies: &[&str]) -> Self {
        let provider = Self::default();
        provider
            .replies
            .lock()
            .unwrap()
            .extend(replies.iter().map(|r| r.to_string()));
        provider
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedProvider {
    async fn complete(&self, _prompt: &Prompt, _credential: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::Envelope("no scripted reply left".to_string()))
    }
}
