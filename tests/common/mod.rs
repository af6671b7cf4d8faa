use relay_service::config::{CommonConfig, NtfyConfig, RelayConfig};
use relay_service::startup::Application;

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the relay on a random port, forwarding to the given ntfy base
    /// URL (usually a wiremock server).
    pub async fn spawn(ntfy_base_url: &str) -> Self {
        let config = RelayConfig {
            common: CommonConfig { port: 0 },
            ntfy: NtfyConfig {
                base_url: ntfy_base_url.to_string(),
                topic: "test-topic".to_string(),
                tags: "incoming_envelope".to_string(),
                priority: "3".to_string(),
                enabled: true,
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }
}
