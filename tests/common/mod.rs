//! Shared fixtures: an in-process fake registry and LoRA directories

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use lora_keywords::{FileIdentifier, hash_bytes};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tokio::sync::RwLock;

/// What the fake registry answers for a hash
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with the given JSON body
    Body(Value),
    /// Bare status code with no body
    Status(u16),
}

impl Reply {
    pub fn words(words: &[&str]) -> Self {
        Self::Body(json!({ "id": 1, "trainedWords": words }))
    }
}

#[derive(Default)]
struct RegistryState {
    replies: RwLock<HashMap<String, Reply>>,
    hits: AtomicUsize,
}

/// Civitai-shaped registry served by axum on a random local port
pub struct FakeRegistry {
    pub addr: SocketAddr,
    state: Arc<RegistryState>,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeRegistry {
    pub async fn start() -> Self {
        let state = Arc::new(RegistryState::default());
        let app = Router::new()
            .route("/api/v1/model-versions/by-hash/{hash}", get(by_hash))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake registry");
        let addr = listener.local_addr().expect("No local addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake registry failed");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn set_reply(&self, identifier: &FileIdentifier, reply: Reply) {
        self.state
            .replies
            .write()
            .await
            .insert(identifier.to_string(), reply);
    }

    /// Number of requests served so far
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeRegistry {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn by_hash(State(state): State<Arc<RegistryState>>, Path(hash): Path<String>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    match state.replies.read().await.get(&hash).cloned() {
        Some(Reply::Body(body)) => (StatusCode::OK, Json(body)).into_response(),
        Some(Reply::Status(code)) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Model not found" })),
        )
            .into_response(),
    }
}

/// URL of a local port with nothing listening
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");
    drop(listener);
    format!("http://{}", addr)
}

/// Temp workspace with a LoRA directory and a cache directory
pub struct Workspace {
    pub root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(root.path().join("Lora")).expect("Failed to create Lora dir");
        Self { root }
    }

    pub fn lora_dir(&self) -> std::path::PathBuf {
        self.root.path().join("Lora")
    }

    pub fn cache_dir(&self) -> std::path::PathBuf {
        self.root.path().join("known")
    }

    /// Write a LoRA file and return its identifier
    pub fn add_lora(&self, relative: &str, content: &[u8]) -> FileIdentifier {
        let path = self.lora_dir().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create LoRA subdir");
        }
        std::fs::write(&path, content).expect("Failed to write LoRA file");
        hash_bytes(content)
    }

    pub fn record_path(&self, identifier: &FileIdentifier) -> std::path::PathBuf {
        self.cache_dir().join(format!("{}.json", identifier))
    }
}
