use super::{ProviderError, ProviderResponse, PushMessage, PushProvider};
use crate::config::NtfyConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct NtfyProvider {
    config: NtfyConfig,
    client: Client,
}

impl NtfyProvider {
    pub fn new(config: NtfyConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn topic_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.topic
        )
    }
}

#[async_trait]
impl PushProvider for NtfyProvider {
    async fn send(&self, push: &PushMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotEnabled(
                "ntfy push provider is not enabled".to_string(),
            ));
        }

        if self.config.topic.is_empty() {
            return Err(ProviderError::Configuration(
                "ntfy topic is not configured".to_string(),
            ));
        }

        // Header values must not contain control bytes.
        let title: String = push
            .title
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        let response = self
            .client
            .post(self.topic_url())
            .header("Title", title)
            .header("Tags", &self.config.tags)
            .header("Priority", &self.config.priority)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(push.body.clone())
            .send()
            .await
            .map_err(|e| ProviderError::Connection(format!("Failed to connect to ntfy: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(
                topic = %self.config.topic,
                status = %status,
                "Message forwarded to ntfy"
            );
            Ok(ProviderResponse::success(status.as_u16()))
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                topic = %self.config.topic,
                status = %status,
                "ntfy rejected the message"
            );
            Ok(ProviderResponse::failure(
                status.as_u16(),
                format!("ntfy returned status {}: {}", status, body),
            ))
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if !self.config.enabled {
            return Ok(());
        }

        // ntfy has no dedicated health endpoint; validate the config instead.
        if self.config.topic.is_empty() {
            return Err(ProviderError::Configuration(
                "ntfy topic is not configured".to_string(),
            ));
        }

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Mock push provider for testing
pub struct MockPushProvider {
    enabled: bool,
    send_count: AtomicU64,
}

impl MockPushProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            send_count: AtomicU64::new(0),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    async fn send(&self, push: &PushMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "Mock push provider is not enabled".to_string(),
            ));
        }

        self.send_count.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            title = %push.title,
            body_length = %push.body.len(),
            "[MOCK] Push notification would be sent"
        );

        Ok(ProviderResponse::success(200))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
