#![allow(dead_code)]

use bfhl_service::config::BfhlConfig;
use bfhl_service::services::providers::mock::MockTextProvider;
use bfhl_service::services::providers::TextProvider;
use bfhl_service::services::AiBridge;
use bfhl_service::startup::Application;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_EMAIL: &str = "tester@chitkara.edu.in";

pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the app without an AI credential.
    pub async fn spawn() -> Self {
        Self::spawn_with_bridge(AiBridge::new(None, Duration::from_secs(5))).await
    }

    /// Spawn the app with a mock AI provider.
    pub async fn spawn_with_provider(provider: Arc<MockTextProvider>) -> Self {
        let bridge = AiBridge::new(
            Some(provider as Arc<dyn TextProvider>),
            Duration::from_secs(5),
        );
        Self::spawn_with_bridge(bridge).await
    }

    async fn spawn_with_bridge(bridge: AiBridge) -> Self {
        let config = BfhlConfig::for_tests(TEST_EMAIL);

        let app = Application::build_with_bridge(config, bridge)
            .await
            .expect("Failed to build test application");

        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            http_address,
            http_port,
            client,
        }
    }

    pub async fn post_bfhl(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/bfhl", self.http_address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
