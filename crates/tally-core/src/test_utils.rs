//! Test utilities for tally-core
//!
//! This module provides a mock Ollama server that speaks just enough of the
//! Ollama HTTP API for the interpreter to run end to end.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::ai::{AIBackend, MockBackend};

/// How the server answers `/api/generate`
#[derive(Clone)]
enum Reply {
    /// Same keyword heuristics as [`MockBackend`]
    Heuristic,
    /// Fixed completion text
    Fixed(String),
}

#[derive(Clone)]
struct ServerState {
    reply: Reply,
    delay: Option<Duration>,
    prompts: Arc<Mutex<Vec<String>>>,
}

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    prompts: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start a server that answers with the mock backend heuristics
    pub async fn start() -> Self {
        Self::spawn(Reply::Heuristic, None).await
    }

    /// Start a server that returns `raw` for every completion
    pub async fn start_with_reply(raw: &str) -> Self {
        Self::spawn(Reply::Fixed(raw.to_string()), None).await
    }

    /// Start a server that waits `delay` before answering each completion
    pub async fn start_slow(delay: Duration) -> Self {
        Self::spawn(Reply::Heuristic, Some(delay)).await
    }

    async fn spawn(reply: Reply, delay: Option<Duration>) -> Self {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            reply,
            delay,
            prompts: prompts.clone(),
        };

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            prompts,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Prompts received so far, oldest first
    pub fn received_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "gemma3:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 3_300_000_000,
        }],
    })
}

/// Ollama generate endpoint
async fn handle_generate(
    State(state): State<ServerState>,
    Json(request): Json<GenerateRequest>,
) -> Json<GenerateResponse> {
    state.prompts.lock().unwrap().push(request.prompt.clone());

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    let response = match state.reply {
        Reply::Fixed(raw) => raw,
        Reply::Heuristic => MockBackend::new()
            .complete(&request.prompt)
            .await
            .unwrap_or_else(|_| r#"{"erro": "not_an_expense"}"#.to_string()),
    };

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
}

// Request/Response types for the mock server

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[allow(dead_code)]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}
