//! Adyen notification webhook.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Form;

use adyen_hpp_core::{AdyenGateway, FieldSet, GatewayRequest, PaymentDetails, Reply};

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::PaymentId;

/// Body Adyen expects from a notification endpoint that accepted the event.
pub const ACCEPTED_BODY: &str = "[accepted]";

/// Handle an Adyen server-to-server notification for a payment.
///
/// The HTTP status is the validation outcome code: 200 accepted, 401
/// missing reference, 402 reference mismatch, 403 bad signature. Only an
/// accepted notification changes the stored payment. A notification for an
/// unknown payment is validated against empty details and so never
/// succeeds.
pub async fn adyen_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PaymentId>,
    Form(fields): Form<FieldSet>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let gateway = &state.gateway;
    let mut reply = None;

    state
        .store
        .update(
            &id,
            Box::new(|details: &mut PaymentDetails| {
                let notified = notify(gateway, details, &fields);
                let accepted =
                    matches!(&notified, Reply::Notified(outcome) if outcome.is_accepted());
                reply = Some(notified);
                accepted
            }),
        )
        .await;

    let reply = match reply {
        Some(reply) => reply,
        None => {
            tracing::warn!(payment_id = %id, "Notification for unknown payment");
            notify(gateway, &mut PaymentDetails::default(), &fields)
        }
    };

    let outcome = match reply {
        Reply::Notified(outcome) => outcome,
        other => {
            return Err(ApiError::Internal(format!(
                "unexpected gateway reply: {other:?}"
            )))
        }
    };

    let status = StatusCode::from_u16(outcome.code())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let body = if outcome.is_accepted() { ACCEPTED_BODY } else { "" };

    Ok((status, body))
}

fn notify(gateway: &AdyenGateway, details: &mut PaymentDetails, fields: &FieldSet) -> Reply {
    gateway.execute(GatewayRequest::Notify {
        details,
        http_request: fields,
    })
}
