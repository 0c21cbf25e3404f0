//! Payment handlers.
//!
//! These drive the gateway through its four operations: a payment is
//! converted into details, captured (the payer is sent to the HPP and
//! later returns), and its status is read back.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use adyen_hpp_core::{
    CaptureTokens, Catalog, FieldSet, GatewayRequest, HostedPaymentRequest, NotifyToken, Payment,
    PaymentDetails, PaymentStatus, Reply,
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::PaymentId;

/// Create payment request.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// The payment to convert.
    #[serde(flatten)]
    pub payment: Payment,
    /// Optional payment method preset (e.g. `adyen_giropay`).
    #[serde(default)]
    pub method: Option<String>,
}

/// Payment status response.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: PaymentId,
    /// Lifecycle state.
    pub status: PaymentStatus,
}

/// Outcome of a capture or payer return.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CaptureResponse {
    /// The browser must POST `fields` to `url`.
    PostRedirect {
        /// HPP endpoint.
        url: String,
        /// Signed form fields.
        fields: FieldSet,
    },
    /// The payer came back from the HPP.
    Returned {
        /// Whether the return was signed by Adyen.
        verified: bool,
        /// Lifecycle state after the return.
        status: PaymentStatus,
    },
}

/// Create a payment from a generic payment description.
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    if body.payment.number.trim().is_empty() {
        return Err(ApiError::BadRequest("Payment number is required".into()));
    }
    if body.payment.total_amount <= 0 {
        return Err(ApiError::BadRequest("Amount must be positive".into()));
    }
    if body.payment.currency_code.trim().is_empty() {
        return Err(ApiError::BadRequest("Currency code is required".into()));
    }
    if body
        .payment
        .client_email
        .as_deref()
        .map_or(true, |email| email.trim().is_empty())
    {
        return Err(ApiError::BadRequest("Client email is required".into()));
    }

    let mut details = PaymentDetails::new();
    expect_done(state.gateway.execute(GatewayRequest::Convert {
        payment: &body.payment,
        details: &mut details,
    }))?;

    if let Some(method) = body.method.as_deref() {
        state.gateway.apply_method(&mut details, method);
    }

    let status = state.gateway.status(&details);
    let id = state.store.insert(details).await;

    tracing::info!(
        payment_id = %id,
        merchant_reference = %body.payment.number,
        amount = body.payment.total_amount,
        currency = %body.payment.currency_code,
        "Payment created"
    );

    Ok((StatusCode::CREATED, Json(PaymentResponse { id, status })))
}

/// Start the hosted payment page session for a payment.
pub async fn capture_payment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PaymentId>,
) -> Result<Json<CaptureResponse>, ApiError> {
    // The notify token's target becomes `resURL`, where Adyen sends the
    // payer back with the signed result. Server-to-server notifications
    // arrive separately on the webhook route.
    let tokens = CaptureTokens {
        capture_hash: uuid::Uuid::new_v4().simple().to_string(),
        notify: Some(NotifyToken {
            hash: uuid::Uuid::new_v4().simple().to_string(),
            target_url: return_url(&state, id),
        }),
    };

    run_capture(&state, id, &FieldSet::new(), Some(&tokens))
        .await
        .map(|(_, response)| Json(response))
}

/// Take the payer's return from the HPP.
///
/// Responds with `403 Forbidden` when the return's signature is invalid.
pub async fn payment_return(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PaymentId>,
    Query(query): Query<FieldSet>,
) -> Result<(StatusCode, Json<CaptureResponse>), ApiError> {
    let (verified, response) = run_capture(&state, id, &query, None).await?;
    let status = if verified {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };
    Ok((status, Json(response)))
}

/// Hosted payment page session request.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Merchant reference.
    pub id: String,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Payer's identifier in the merchant's system.
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Payer's email address.
    pub customer_email: String,
    /// Where the payer returns after paying.
    #[serde(default)]
    pub return_url: Option<String>,
    /// Optional payment method preset (e.g. `adyen_giropay`).
    #[serde(default)]
    pub method: Option<String>,
}

/// Sign a one-off HPP session without storing a payment.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<Json<CaptureResponse>, ApiError> {
    let request = HostedPaymentRequest {
        id: body.id,
        amount_minor: body.amount_minor,
        currency: body.currency,
        customer_id: body.customer_id,
        customer_email: body.customer_email,
        return_url: body.return_url,
        method: body.method,
    };
    if request.amount_minor <= 0 {
        return Err(ApiError::BadRequest("Amount must be positive".into()));
    }

    let fields = state
        .gateway
        .start_hosted_payment_pages(&request, chrono::Utc::now());

    let missing = fields.missing(Catalog::Required);
    if !missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Session lacks required fields: {}",
            missing.join(", ")
        )));
    }

    tracing::info!(merchant_reference = %request.id, "HPP session signed");

    Ok(Json(CaptureResponse::PostRedirect {
        url: state.gateway.api_endpoint().to_string(),
        fields,
    }))
}

/// Get the lifecycle state of a payment.
pub async fn payment_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<PaymentId>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let details = load(&state, &id).await?;

    match state.gateway.execute(GatewayRequest::Status { details: &details }) {
        Reply::Status(status) => Ok(Json(PaymentResponse { id, status })),
        other => Err(unexpected(&other)),
    }
}

/// Run a capture and persist the details it changed.
///
/// The boolean is `false` only for a return whose signature failed. A
/// redirect lacking required fields is refused and nothing is stored.
async fn run_capture(
    state: &AppState,
    id: PaymentId,
    http_request: &FieldSet,
    tokens: Option<&CaptureTokens>,
) -> Result<(bool, CaptureResponse), ApiError> {
    let gateway = &state.gateway;
    let now = chrono::Utc::now();
    let mut outcome = None;

    let found = state
        .store
        .update(
            &id,
            Box::new(|details: &mut PaymentDetails| {
                let reply = gateway.execute(GatewayRequest::Capture {
                    details: &mut *details,
                    http_request,
                    tokens,
                    now,
                });
                let result = capture_response(reply, details, gateway.status(details));
                let keep = matches!(result, Ok((true, _)));
                outcome = Some(result);
                keep
            }),
        )
        .await;

    match outcome {
        Some(result) => result,
        None if !found => Err(ApiError::NotFound(format!("Payment {id} not found"))),
        None => Err(ApiError::Internal("capture did not run".into())),
    }
}

fn capture_response(
    reply: Reply,
    details: &PaymentDetails,
    status: PaymentStatus,
) -> Result<(bool, CaptureResponse), ApiError> {
    match reply {
        Reply::PostRedirect { url, fields } => {
            let missing = fields.missing(Catalog::Required);
            if !missing.is_empty() {
                tracing::warn!(
                    merchant_reference = ?details.merchant_reference(),
                    ?missing,
                    "Refusing to redirect an incomplete payment"
                );
                return Err(ApiError::BadRequest(format!(
                    "Payment lacks required fields: {}",
                    missing.join(", ")
                )));
            }
            Ok((true, CaptureResponse::PostRedirect { url, fields }))
        }
        Reply::Returned { verified } => {
            Ok((verified, CaptureResponse::Returned { verified, status }))
        }
        other => Err(unexpected(&other)),
    }
}

async fn load(state: &AppState, id: &PaymentId) -> Result<PaymentDetails, ApiError> {
    state
        .store
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Payment {id} not found")))
}

fn expect_done(reply: Reply) -> Result<(), ApiError> {
    match reply {
        Reply::Done => Ok(()),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(reply: &Reply) -> ApiError {
    ApiError::Internal(format!("unexpected gateway reply: {reply:?}"))
}

fn return_url(state: &AppState, id: PaymentId) -> String {
    format!("{}/v1/payments/{id}/return", state.config.public_url)
}
