use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::models::InboundPayload;
use crate::services::{normalize, record_forward, record_provider_call, PushMessage};
use crate::startup::AppState;

#[derive(Debug, Serialize)]
pub struct ForwardResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntfy_status: Option<u16>,
}

/// Forward an inbound notification payload to the push service.
///
/// Malformed input is absorbed by the normalizer; an upstream rejection or
/// network failure is reported in the response body, never raised.
#[tracing::instrument(skip(state, body))]
pub async fn forward(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<ForwardResponse>), AppError> {
    let payload = InboundPayload::from_body(&body);
    let formatted = normalize(&payload);

    let push = PushMessage {
        title: formatted.title,
        body: formatted.body,
    };

    let response = match state.push_provider.send(&push).await {
        Ok(outcome) => {
            record_provider_call("ntfy", if outcome.success { "sent" } else { "rejected" });
            if outcome.success {
                tracing::info!(status = outcome.status, "Message forwarded");
            } else {
                tracing::warn!(status = outcome.status, "Push service rejected the message");
            }
            ForwardResponse {
                success: outcome.success,
                message: if outcome.success {
                    "Message forwarded to ntfy".to_string()
                } else {
                    "Forwarding to ntfy failed".to_string()
                },
                ntfy_status: Some(outcome.status),
            }
        }
        Err(e) => {
            record_provider_call("ntfy", "error");
            tracing::error!(error = %e, "Failed to reach push service");
            ForwardResponse {
                success: false,
                message: "Forwarding to ntfy failed".to_string(),
                ntfy_status: None,
            }
        }
    };

    record_forward(if response.success { "success" } else { "failed" });

    Ok((StatusCode::OK, Json(response)))
}
