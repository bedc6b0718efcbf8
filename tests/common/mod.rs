// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use quiz_backend::{
    config::{Config, DEFAULT_CORS_ORIGINS, DEFAULT_LEADERBOARD_LIMIT, offset_from_minutes},
    db,
    ports::{ProfileProvider, ProviderError, ProviderResult, TextGenerator},
    routes,
    state::AppState,
};
use sqlx::SqlitePool;

pub const NOTE_TEXT: &str = "\
### Title:
Newton's Laws

### Reading Time:
4 minutes

### Notes:
An object stays at rest or in uniform motion unless acted on by a net force.

### True/False Questions:
1. Force equals mass times acceleration.
True
- This is Newton's second law.
2. Action and reaction act on the same body.
False
- They act on different bodies.

### Summary:
Three laws relate force, mass and motion.
";

/// Counts calls and returns a fixed completion.
#[derive(Default)]
pub struct FakeGenerator {
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(NOTE_TEXT.to_string())
    }
}

/// Always fails, to exercise the upstream error path.
pub struct BrokenGenerator;

#[async_trait]
impl TextGenerator for BrokenGenerator {
    async fn generate(&self, _prompt: &str) -> ProviderResult<String> {
        Err(ProviderError::Status {
            status: 500,
            body: "boom".to_string(),
        })
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_address: "127.0.0.1:0".parse().unwrap(),
        rust_log: "error".to_string(),
        cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        summary_offset: offset_from_minutes(330).unwrap(),
        leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        identity_api_url: "http://127.0.0.1:9".to_string(),
        identity_api_key: None,
        identity_timeout: Duration::from_millis(200),
        llm_api_url: "http://127.0.0.1:9".to_string(),
        llm_api_key: None,
        llm_model: "test-model".to_string(),
        llm_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(30),
    }
}

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

/// Spawns the app on a random port against a fresh in-memory database.
pub async fn spawn_app_with(
    text_generator: Option<Arc<dyn TextGenerator>>,
    profiles: Option<Arc<dyn ProfileProvider>>,
) -> TestApp {
    let pool = db::in_memory()
        .await
        .expect("Failed to create in-memory database");

    let state = AppState {
        pool: pool.clone(),
        config: test_config(),
        text_generator,
        profiles,
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        client: reqwest::Client::new(),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(None, None).await
}
