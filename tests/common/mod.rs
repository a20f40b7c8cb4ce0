use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use cipherstudio_api::app::{app, AppState};
use cipherstudio_api::auth::JwtKeys;
use cipherstudio_api::config::{AppConfig, StorageBackend};
use cipherstudio_api::database::MemoryProjectRepository;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub base_url: String,
    keys: JwtKeys,
}

impl TestServer {
    /// Start an in-process server on a free port with memory storage
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::from_env();
        config.storage.backend = StorageBackend::Memory;
        config.security.jwt_secret = TEST_SECRET.to_string();

        let keys = JwtKeys::new(TEST_SECRET, 1);
        let state = AppState::new(
            Arc::new(MemoryProjectRepository::new()),
            keys.clone(),
            Arc::new(config),
        );

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self { base_url, keys };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token_for(&self, user_id: &str) -> String {
        self.keys
            .generate_jwt(user_id)
            .unwrap_or_else(|e| panic!("failed to mint token: {}", e))
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/api/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}
