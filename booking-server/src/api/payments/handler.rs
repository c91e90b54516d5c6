//! Payment API Handlers

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use shared::ApiResponse;
use shared::models::PaymentMethod;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::booking::{PaymentConfirmation, PaymentSession};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, AppResult, ok_with_message};

/// Request body for starting a payment
#[derive(Debug, Deserialize, Validate)]
pub struct InitiatePaymentRequest {
    pub reservation_id: i64,
    pub method: PaymentMethod,
    #[validate(length(min = 6, max = 20))]
    pub phone_number: Option<String>,
}

/// Start a payment for a pending reservation (owner or admin)
///
/// The charged amount comes from the trip; any amount sent by the client
/// is ignored. Responds 201 with the created payment session.
pub async fn initiate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<InitiatePaymentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PaymentSession>>)> {
    payload.validate()?;

    let detail = state
        .booking()
        .get_reservation_detail(payload.reservation_id)?;
    if !user.can_access(detail.reservation.user_id) {
        return Err(AppError::forbidden("Not your reservation"));
    }

    let session = state.booking().initiate_payment(
        payload.reservation_id,
        payload.method,
        payload.phone_number,
    )?;

    Ok((
        StatusCode::CREATED,
        ok_with_message(session, "Payment initiated"),
    ))
}

/// Request body for the client-side confirmation poll
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub transaction_id: String,
}

/// Confirm a payment by gateway transaction ID (idempotent)
///
/// Public route: the transaction ID itself is the capability. Repeated
/// calls return the same ticket.
pub async fn verify(
    State(state): State<ServerState>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentConfirmation>>> {
    let confirmation = state.booking().confirm_payment(&payload.transaction_id)?;
    Ok(ok_with_message(confirmation, "Payment confirmed"))
}

/// Gateway callback payload
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub transaction_id: String,
    pub status: String,
}

/// Gateway webhook - converges on the same transitions as [`verify`]
///
/// When `WEBHOOK_SECRET` is configured, the `x-webhook-secret` header
/// must match or the callback is rejected.
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    if let Some(secret) = &state.config.webhook_secret {
        let presented = headers
            .get("x-webhook-secret")
            .and_then(|h| h.to_str().ok());
        if presented != Some(secret.as_str()) {
            security_log!(
                "WARN",
                "webhook_rejected",
                transaction_id = payload.transaction_id.clone()
            );
            return Err(AppError::forbidden("Invalid webhook secret"));
        }
    }

    match payload.status.as_str() {
        "successful" | "completed" => {
            let confirmation = state.booking().confirm_payment(&payload.transaction_id)?;
            Ok(ok_with_message(
                serde_json::json!({
                    "transaction_id": confirmation.payment.transaction_id,
                    "ticket_number": confirmation.ticket.ticket_number,
                }),
                "Payment confirmed",
            ))
        }
        "failed" => {
            let payment = state.booking().fail_payment(&payload.transaction_id)?;
            Ok(ok_with_message(
                serde_json::json!({
                    "transaction_id": payment.transaction_id,
                    "status": payment.status,
                }),
                "Payment marked failed",
            ))
        }
        other => Err(AppError::validation(format!(
            "Unknown payment status: {}",
            other
        ))),
    }
}
