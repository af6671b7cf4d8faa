pub mod ntfy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ntfy::{MockPushProvider, NtfyProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not enabled: {0}")]
    NotEnabled(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    SendFailed(String),
}

/// Outcome of an outbound push call. A non-success upstream status is carried
/// here rather than raised as an error, so the handler can report it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub status: u16,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProviderResponse {
    pub fn success(status: u16) -> Self {
        Self {
            status,
            success: true,
            message: None,
        }
    }

    pub fn failure(status: u16, message: String) -> Self {
        Self {
            status,
            success: false,
            message: Some(message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
}

#[async_trait]
pub trait PushProvider: Send + Sync {
    async fn send(&self, push: &PushMessage) -> Result<ProviderResponse, ProviderError>;
    async fn health_check(&self) -> Result<(), ProviderError>;
    fn is_enabled(&self) -> bool;
}
