//! Payment provider webhook ingress.
//!
//! Order matters: rate limit, then signature over the raw bytes, then JSON
//! parse, then dispatch. Nothing is mutated before the signature check
//! passes, and every attempt is audited whether or not it is accepted.

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;

use crate::domain::event::{WebhookEvent, CHARGE_SUCCESS};
use crate::error::AppError;
use crate::security::events as audit;
use crate::security::signature;
use crate::services::payments;
use crate::services::subscriptions;
use crate::AppState;

const CHARGE_FAILED: &str = "charge.failed";

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    pub received: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl WebhookAck {
    fn ok() -> Self {
        Self {
            success: true,
            received: true,
            warnings: Vec::new(),
        }
    }

    fn with_warnings(warnings: Vec<String>) -> Self {
        Self {
            success: true,
            received: true,
            warnings,
        }
    }
}

/// Source key for throttling: the first `x-forwarded-for` hop when the
/// service sits behind a proxy, otherwise the peer address.
fn source_key(headers: &HeaderMap, connect_info: Option<&ConnectInfo<SocketAddr>>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
        .or_else(|| connect_info.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn payment_callback(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let source = source_key(&headers, connect_info.as_ref());

    if !state.rate_limiter.allow(&source) {
        state
            .security_events
            .log(
                audit::WEBHOOK_RATE_LIMIT,
                "webhook source exceeded request budget",
                json!({ "source": source }),
            )
            .await;
        return AppError::RateLimited.into_response();
    }

    let Some(secret) = state.webhook_secret.as_deref() else {
        tracing::error!("webhook delivery received but WEBHOOK_SECRET is not configured");
        return AppError::Configuration("Webhook secret not configured".to_string())
            .into_response();
    };

    let signature_header = headers
        .get(signature::SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    if !signature::verify(&body, signature_header, secret) {
        // Never log the secret or a computed digest; presence of the header
        // is the only signature detail recorded.
        state
            .security_events
            .log(
                audit::INVALID_WEBHOOK_SIGNATURE,
                "webhook signature verification failed",
                json!({
                    "source": source,
                    "signature_present": signature_header.is_some(),
                }),
            )
            .await;
        return AppError::InvalidSignature.into_response();
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            state
                .security_events
                .log(
                    audit::MALFORMED_WEBHOOK_PAYLOAD,
                    "signed webhook body is not a valid event envelope",
                    json!({ "source": source, "parse_error": e.to_string() }),
                )
                .await;
            return AppError::BadRequest("Invalid JSON payload".to_string()).into_response();
        }
    };

    state
        .security_events
        .log(
            audit::WEBHOOK_RECEIVED,
            "verified webhook delivery accepted",
            json!({
                "source": source.clone(),
                "event": event.event.clone(),
                "reference": event.data.reference.clone(),
            }),
        )
        .await;

    match event.event.as_str() {
        CHARGE_SUCCESS => handle_charge_success(&state, &source, &event).await,
        CHARGE_FAILED => handle_charge_failed(&state, &event).await,
        other => {
            tracing::debug!(event = other, "ignoring unhandled webhook event type");
            (StatusCode::OK, Json(WebhookAck::ok())).into_response()
        }
    }
}

async fn handle_charge_success(state: &AppState, source: &str, event: &WebhookEvent) -> Response {
    let data = &event.data;

    if data.amount < 0 {
        return bad_metadata(state, source, "negative amount in charge event").await;
    }
    let Some(business_id) = data.metadata.business_id else {
        return bad_metadata(state, source, "missing businessId in event metadata").await;
    };

    let result = match data.metadata.plan_id.as_deref() {
        Some(plan_id) => {
            subscriptions::process_subscription_payment(&state.db, data, business_id, plan_id)
                .await
        }
        None => {
            payments::process_booking_payment(
                &state.db,
                &state.default_commission_rate,
                data,
                business_id,
            )
            .await
        }
    };

    match result {
        Ok(processed) => {
            for warning in &processed.warnings {
                tracing::warn!(
                    reference = %data.reference,
                    warning = %warning,
                    "secondary effect degraded"
                );
            }
            (
                StatusCode::OK,
                Json(WebhookAck::with_warnings(processed.warnings)),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(reference = %data.reference, error = %e, "webhook processing failed");
            state
                .security_events
                .log(
                    audit::WEBHOOK_PROCESSING_ERROR,
                    "charge.success processing failed",
                    json!({ "reference": data.reference.clone(), "error": e.to_string() }),
                )
                .await;
            e.into_response()
        }
    }
}

async fn handle_charge_failed(state: &AppState, event: &WebhookEvent) -> Response {
    if let Some(booking_id) = event.data.metadata.booking_id {
        if let Err(e) = payments::process_booking_payment_failure(&state.db, booking_id).await {
            tracing::error!(%booking_id, error = %e, "failed-charge booking update error");
            return e.into_response();
        }
    }
    (StatusCode::OK, Json(WebhookAck::ok())).into_response()
}

async fn bad_metadata(state: &AppState, source: &str, description: &str) -> Response {
    state
        .security_events
        .log(
            audit::MALFORMED_WEBHOOK_PAYLOAD,
            description,
            json!({ "source": source }),
        )
        .await;
    AppError::BadRequest(description.to_string()).into_response()
}
