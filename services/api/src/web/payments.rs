//! services/api/src/web/payments.rs
//!
//! Manual payment submission, payer history and the admin review queue.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{de::IgnoredAny, Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::{payments, Decision, Payment, PaymentStatus, PaymentSubmission, ServiceError};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::web::{
    middleware::Caller,
    rest::{gate_admin, CreatedResponse, HttpError, JsonBody, MessageResponse},
    state::AppState,
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// The payment form filled in by a payer.
#[derive(Deserialize, ToSchema, Default)]
#[serde(deny_unknown_fields)]
pub struct SubmitPaymentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub sender_number: String,
    #[serde(default)]
    pub receive_number: String,
    #[serde(default)]
    pub transaction_id: String,
    /// URL of an uploaded proof-of-payment image.
    pub img: Option<String>,
    pub course_id: Option<Uuid>,
    /// Accepted in any shape and ignored: new payments are always `pending`.
    #[schema(value_type = Option<Object>)]
    pub status: Option<IgnoredAny>,
}

#[derive(Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DecisionRequest {
    /// `approved` or `rejected`.
    pub status: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPaymentsQuery {
    /// Only return payments in this status.
    pub status: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// The payer's email address.
    pub email: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub sender_number: String,
    pub receive_number: String,
    pub transaction_id: String,
    pub img: Option<String>,
    pub course_id: Uuid,
    pub course_name: String,
    pub price: f64,
    /// Only present where the viewer is entitled to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_link: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentResponse {
    pub fn from_payment(payment: Payment, reveal_link: bool) -> Self {
        Self {
            id: payment.id,
            name: payment.payer_name,
            email: payment.payer_email,
            phone_number: payment.payer_phone,
            sender_number: payment.sender_account,
            receive_number: payment.receiver_account,
            transaction_id: payment.transaction_ref,
            img: payment.evidence_url,
            course_id: payment.course_id,
            course_name: payment.course_name,
            price: payment.course_price,
            delivery_link: reveal_link.then_some(payment.delivery_link),
            status: payment.status.to_string(),
            created_at: payment.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DecisionResponse {
    pub message: String,
    pub payment: PaymentResponse,
}

fn parse_decision(raw: &str) -> Result<Decision, HttpError> {
    match raw.trim() {
        "approved" => Ok(Decision::Approved),
        "rejected" => Ok(Decision::Rejected),
        other => Err(ServiceError::Validation(format!(
            "status must be 'approved' or 'rejected', got '{}'",
            other
        ))
        .into()),
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /payments - Submit a manual payment for review
#[utoipa::path(
    post,
    path = "/payments",
    request_body = SubmitPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded as pending", body = CreatedResponse),
        (status = 400, description = "Missing or invalid fields")
    )
)]
pub async fn submit_payment_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<SubmitPaymentRequest>,
) -> Result<impl IntoResponse, HttpError> {
    if req.status.is_some() {
        debug!("Ignoring client-supplied payment status");
    }

    let payment = payments::submit(
        state.db.as_ref(),
        PaymentSubmission {
            payer_name: req.name,
            payer_email: req.email,
            payer_phone: req.phone_number,
            sender_account: req.sender_number,
            receiver_account: req.receive_number,
            transaction_ref: req.transaction_id,
            evidence_url: req.img,
            course_id: req.course_id,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Success".to_string(),
            id: payment.id,
        }),
    ))
}

/// GET /payments - The review queue (admin only)
#[utoipa::path(
    get,
    path = "/payments",
    params(
        ListPaymentsQuery,
        ("admin_uid" = Option<String>, Query, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Payments, newest first", body = [PaymentResponse]),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_payments_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    gate_admin(&state, &caller).await?;
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse::<PaymentStatus>())
        .transpose()
        .map_err(|e| HttpError::from(ServiceError::Validation(e)))?;

    let payments = payments::list(state.db.as_ref(), caller.as_deref(), status).await?;
    Ok(Json(
        payments
            .into_iter()
            .map(|p| PaymentResponse::from_payment(p, true))
            .collect::<Vec<_>>(),
    ))
}

/// GET /payments/history - A payer's own payments
///
/// The delivery link is only included once a payment has been approved.
#[utoipa::path(
    get,
    path = "/payments/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "The payer's payments, newest first", body = [PaymentResponse]),
        (status = 400, description = "Missing or invalid email")
    )
)]
pub async fn payment_history_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let email = query.email.unwrap_or_default();
    let payments = payments::history(state.db.as_ref(), &email).await?;
    Ok(Json(
        payments
            .into_iter()
            .map(|p| {
                let approved = p.status == PaymentStatus::Approved;
                PaymentResponse::from_payment(p, approved)
            })
            .collect::<Vec<_>>(),
    ))
}

/// PATCH /payments/{id}/decision - Approve or reject a pending payment (admin only)
///
/// Approval emails the course delivery link to the payer in the background; the
/// response does not wait for it.
#[utoipa::path(
    patch,
    path = "/payments/{id}/decision",
    request_body = DecisionRequest,
    params(
        ("id" = Uuid, Path, description = "Payment id"),
        ("admin_uid" = Option<String>, Query, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Payment decided", body = DecisionResponse),
        (status = 400, description = "Unknown decision"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such payment"),
        (status = 409, description = "Payment was already decided")
    )
)]
pub async fn decide_payment_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(payment_id): Path<Uuid>,
    body: Result<JsonBody<DecisionRequest>, HttpError>,
) -> Result<impl IntoResponse, HttpError> {
    gate_admin(&state, &caller).await?;
    let JsonBody(req) = body?;
    let decision = parse_decision(&req.status)?;

    let outcome = payments::decide(
        state.db.as_ref(),
        &state.delivery,
        caller.as_deref(),
        payment_id,
        decision,
    )
    .await?;

    let message = match decision {
        Decision::Approved => "Payment approved",
        Decision::Rejected => "Payment rejected",
    };
    Ok(Json(DecisionResponse {
        message: message.to_string(),
        payment: PaymentResponse::from_payment(outcome.payment, true),
    }))
}

/// DELETE /payments/{id} - Remove a payment record (admin only)
#[utoipa::path(
    delete,
    path = "/payments/{id}",
    params(
        ("id" = Uuid, Path, description = "Payment id"),
        ("admin_uid" = Option<String>, Query, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Payment deleted", body = MessageResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such payment")
    )
)]
pub async fn delete_payment_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    payments::archive_delete(state.db.as_ref(), caller.as_deref(), payment_id).await?;
    Ok(MessageResponse::new("Deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_terminal_decisions_parse() {
        assert_eq!(parse_decision("approved").unwrap(), Decision::Approved);
        assert_eq!(parse_decision(" rejected ").unwrap(), Decision::Rejected);
        assert!(parse_decision("pending").is_err());
        assert!(parse_decision("APPROVED").is_err());
    }
}
