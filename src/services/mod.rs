pub mod metrics;
pub mod normalizer;
pub mod providers;

pub use metrics::{get_metrics, init_metrics, record_forward, record_provider_call};
pub use normalizer::{normalize, FormattedMessage};
pub use providers::{
    MockPushProvider, NtfyProvider, ProviderError, ProviderResponse, PushMessage, PushProvider,
};
