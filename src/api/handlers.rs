//! HTTP request handlers

use super::signature::{self, SIGNATURE_HEADER};
use super::types::{VerifyQuery, VersionResponse, WebhookResponse};
use super::webhook;
use super::AppState;
use crate::runtime::HandleOutcome;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Cloud API webhook: subscription handshake and event delivery
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .route("/api/webhook", get(verify_webhook).post(receive_webhook))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Webhook Verification
// ============================================================

async fn verify_webhook(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let subscribing = query.mode.as_deref() == Some("subscribe");
    let token_matches = query.verify_token.as_deref() == Some(state.webhook.verify_token.as_str());

    if subscribing && token_matches {
        tracing::info!("Webhook subscription verified");
        (StatusCode::OK, query.challenge.unwrap_or_default()).into_response()
    } else {
        tracing::warn!(
            mode = query.mode.as_deref().unwrap_or(""),
            token_matches,
            "Webhook verification rejected"
        );
        StatusCode::FORBIDDEN.into_response()
    }
}

// ============================================================
// Event Delivery
// ============================================================

async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    if let Some(secret) = state.webhook.app_secret.as_deref() {
        let header = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok());
        if let Err(e) = signature::verify(secret, &body, header) {
            tracing::warn!(error = %e, "Rejected webhook delivery");
            return Err(AppError::Unauthorized(e.to_string()));
        }
    }

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!(error = %e, "Webhook body is not JSON");
        AppError::Internal(format!("invalid JSON payload: {e}"))
    })?;

    let Some(message) = webhook::first_message(&payload) else {
        tracing::debug!("Webhook delivery without messages");
        return Ok(Json(WebhookResponse::success()));
    };

    let inbound = match webhook::normalize(message) {
        Ok(inbound) => inbound,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping malformed webhook message");
            return Ok(Json(WebhookResponse::success()));
        }
    };

    match state.engine.handle(inbound).await {
        Ok(HandleOutcome::Transitioned(record)) => {
            tracing::debug!(
                sender = %record.sender_id,
                to = %record.to,
                sent = record.sent,
                "Webhook message processed"
            );
        }
        Ok(HandleOutcome::Ignored { reason }) => {
            tracing::debug!(reason = reason.as_str(), "Webhook message ignored");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to process webhook message");
            return Err(AppError::Internal(e.to_string()));
        }
    }

    Ok(Json(WebhookResponse::success()))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    Unauthorized(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(WebhookResponse::error(message))).into_response()
    }
}
