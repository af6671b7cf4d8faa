pub mod forward;
pub mod health;

pub use forward::{forward, ForwardResponse};
pub use health::{health_check, metrics_endpoint, readiness_check};
