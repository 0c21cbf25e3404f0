//! The Adyen HPP gateway and its operations.
//!
//! The host hands the gateway one [`GatewayRequest`] at a time and acts on
//! the returned [`Reply`]. Each operation is a plain function of its
//! inputs; the only shared state is the immutable configuration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{GatewayConfig, GatewayOptions};
use crate::details::{PaymentDetails, AUTH_RESULT, EXTRA_DATA, RESPONSE_STATUS};
use crate::error::Result;
use crate::fields::{Catalog, FieldSet, MERCHANT_SIG};
use crate::notification::{self, NotificationOutcome};
use crate::payment::{Payment, PaymentMethodPreset};
use crate::signer::MerchantSigner;
use crate::status::{payment_status, PaymentStatus};

/// HPP endpoint of the test environment.
pub const SANDBOX_ENDPOINT: &str = "https://test.adyen.com/hpp/select.shtml";

/// HPP endpoint of the live environment.
pub const LIVE_ENDPOINT: &str = "https://live.adyen.com/hpp/select.shtml";

/// How long the payer's HPP session stays valid.
const SESSION_VALIDITY_HOURS: i64 = 1;

/// Status recorded for a payer return whose signature verified.
const RETURN_VERIFIED_STATUS: i64 = 200;

/// Tokens the host issued for the capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureTokens {
    /// Hash of the capture token.
    pub capture_hash: String,
    /// Notify token, when the host can issue one.
    pub notify: Option<NotifyToken>,
}

/// A notify token issued by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyToken {
    /// Hash of the notify token.
    pub hash: String,
    /// URL the token resolves to. It is sent as `resURL`, so Adyen
    /// redirects the payer's browser here with the signed result.
    pub target_url: String,
}

/// Input for [`AdyenGateway::start_hosted_payment_pages`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedPaymentRequest {
    /// Merchant reference.
    pub id: String,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Shopper reference.
    pub customer_id: Option<String>,
    /// Shopper email.
    pub customer_email: String,
    /// Result URL.
    pub return_url: Option<String>,
    /// Payment method preset name.
    pub method: Option<String>,
}

/// One operation for the gateway to perform.
#[derive(Debug)]
pub enum GatewayRequest<'a> {
    /// Turn a generic payment into payment details.
    Convert {
        /// Source payment.
        payment: &'a Payment,
        /// Details to fill.
        details: &'a mut PaymentDetails,
    },
    /// Send the payer to the HPP, or take their return.
    Capture {
        /// Payment details.
        details: &'a mut PaymentDetails,
        /// Fields of the current HTTP request.
        http_request: &'a FieldSet,
        /// Tokens issued by the host.
        tokens: Option<&'a CaptureTokens>,
        /// Current time.
        now: DateTime<Utc>,
    },
    /// Process a server-to-server notification.
    Notify {
        /// Payment details.
        details: &'a mut PaymentDetails,
        /// Fields of the notification request.
        http_request: &'a FieldSet,
    },
    /// Report the lifecycle state.
    Status {
        /// Payment details.
        details: &'a PaymentDetails,
    },
}

/// What the host should do after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing further.
    Done,
    /// Halt and POST `fields` to `url` from the payer's browser.
    PostRedirect {
        /// HPP endpoint.
        url: String,
        /// Signed form fields.
        fields: FieldSet,
    },
    /// The payer returned from the HPP.
    Returned {
        /// Whether the return's signature verified.
        verified: bool,
    },
    /// A notification was processed.
    Notified(NotificationOutcome),
    /// The current lifecycle state.
    Status(PaymentStatus),
}

/// Adyen hosted payment page gateway.
#[derive(Debug, Clone)]
pub struct AdyenGateway {
    config: GatewayConfig,
}

impl AdyenGateway {
    /// Validate `options` and build the gateway.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ConfigError`] when the options are unusable.
    pub fn new(options: &GatewayOptions) -> Result<Self> {
        Ok(Self::from_config(options.validate()?))
    }

    /// Build the gateway from an already validated configuration.
    #[must_use]
    pub fn from_config(config: GatewayConfig) -> Self {
        tracing::debug!(
            skin_code = %config.skin_code,
            merchant_account = %config.merchant_account,
            sandbox = config.sandbox,
            notification_method = %config.notification_method,
            "Adyen gateway configured"
        );
        Self { config }
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The signer holding the configured keys.
    #[must_use]
    pub fn signer(&self) -> &MerchantSigner {
        &self.config.signer
    }

    /// HPP endpoint for the configured environment.
    #[must_use]
    pub fn api_endpoint(&self) -> &'static str {
        if self.config.sandbox {
            SANDBOX_ENDPOINT
        } else {
            LIVE_ENDPOINT
        }
    }

    /// Verify `merchantSig` of a signed payment request.
    #[must_use]
    pub fn verify_sign(&self, fields: &FieldSet) -> bool {
        self.signer().verify_sign(fields)
    }

    /// Verify `merchantSig` of the payer's return.
    #[must_use]
    pub fn verify_response(&self, fields: &FieldSet) -> bool {
        self.signer().verify_response(fields)
    }

    /// Verify a notification's HMAC signature.
    #[must_use]
    pub fn verify_notification(&self, fields: &FieldSet) -> bool {
        self.signer().verify_notification(fields)
    }

    /// Complete, filter and sign payment request fields.
    ///
    /// Default payment fields fill gaps, the session dates are set one hour
    /// ahead of `now`, and the skin code and merchant account always come
    /// from the configuration. Unsupported and empty fields are dropped
    /// before `merchantSig` is attached.
    ///
    /// Missing required fields are only logged here; hosts check
    /// [`FieldSet::missing`] before handing the fields to the payer.
    #[must_use]
    pub fn prepare_fields(&self, params: FieldSet, now: DateTime<Utc>) -> FieldSet {
        let expires = now + Duration::hours(SESSION_VALIDITY_HOURS);

        let fields = params
            .into_builder()
            .merge_defaults(&self.config.default_payment_fields)
            .set("shipBeforeDate", expires.format("%Y-%m-%d").to_string())
            .set(
                "sessionValidity",
                expires.format("%Y-%m-%dT%H:%M:%S%:z").to_string(),
            )
            .set("skinCode", self.config.skin_code.as_str())
            .set("merchantAccount", self.config.merchant_account.as_str())
            .retain_catalog(Catalog::PaymentSupported)
            .build();

        let missing = fields.missing(Catalog::Required);
        if !missing.is_empty() {
            tracing::warn!(?missing, "Payment request lacks required fields");
        }

        let sig = self.signer().merchant_sig(&fields);
        fields.with_field(MERCHANT_SIG, sig)
    }

    /// Build signed fields for a hosted payment page session.
    #[must_use]
    pub fn start_hosted_payment_pages(
        &self,
        request: &HostedPaymentRequest,
        now: DateTime<Utc>,
    ) -> FieldSet {
        let mut builder = FieldSet::builder()
            .set("merchantReference", request.id.as_str())
            .set("paymentAmount", request.amount_minor.to_string())
            .set("currencyCode", request.currency.as_str())
            .set("shopperEmail", request.customer_email.as_str())
            .set("shopperReference", request.customer_id.clone().unwrap_or_default())
            .set("resURL", request.return_url.clone().unwrap_or_default());

        if let Some(preset) = request
            .method
            .as_deref()
            .and_then(PaymentMethodPreset::from_name)
        {
            for (name, value) in preset.fields() {
                builder = builder.set(name, value);
            }
        }

        self.prepare_fields(builder.build(), now)
    }

    /// Narrow the HPP of a stored payment to the preset called `method`.
    ///
    /// Returns `false`, leaving the details alone, for an unknown method.
    pub fn apply_method(&self, details: &mut PaymentDetails, method: &str) -> bool {
        match PaymentMethodPreset::from_name(method) {
            Some(preset) => {
                details.extend_from(&preset.fields());
                true
            }
            None => {
                tracing::debug!(method = %method, "Unknown payment method, offering all");
                false
            }
        }
    }

    /// Perform one gateway operation.
    pub fn execute(&self, request: GatewayRequest<'_>) -> Reply {
        match request {
            GatewayRequest::Convert { payment, details } => {
                self.convert(payment, details);
                Reply::Done
            }
            GatewayRequest::Capture {
                details,
                http_request,
                tokens,
                now,
            } => self.capture(details, http_request, tokens, now),
            GatewayRequest::Notify {
                details,
                http_request,
            } => Reply::Notified(self.notify(details, http_request)),
            GatewayRequest::Status { details } => Reply::Status(self.status(details)),
        }
    }

    /// Copy a generic payment into the details.
    pub fn convert(&self, payment: &Payment, details: &mut PaymentDetails) {
        details.set("merchantReference", payment.number.as_str());
        details.set("paymentAmount", payment.total_amount);
        details.set("currencyCode", payment.currency_code.as_str());
        if let Some(email) = &payment.client_email {
            details.set("shopperEmail", email.as_str());
        }
        if let Some(client_id) = &payment.client_id {
            details.set("shopperReference", client_id.as_str());
        }
    }

    /// Redirect the payer to the HPP, or record their signed return.
    ///
    /// A request carrying `authResult` is a return from the HPP. When its
    /// `merchantSig` verifies, the return fields are stored; otherwise the
    /// details are left untouched.
    pub fn capture(
        &self,
        details: &mut PaymentDetails,
        http_request: &FieldSet,
        tokens: Option<&CaptureTokens>,
        now: DateTime<Utc>,
    ) -> Reply {
        if http_request.non_empty(AUTH_RESULT).is_some() {
            let verified = self.verify_response(http_request);
            if verified {
                let returned = http_request
                    .clone()
                    .into_builder()
                    .retain_catalog(Catalog::Response)
                    .build();
                details.extend_from(&returned);
                details.set(RESPONSE_STATUS, RETURN_VERIFIED_STATUS);
                tracing::debug!(
                    merchant_reference = ?details.merchant_reference(),
                    auth_result = ?details.auth_result(),
                    "Payer return verified"
                );
            } else {
                tracing::warn!(
                    merchant_reference = ?http_request.get("merchantReference"),
                    "Payer return has an invalid signature"
                );
            }
            return Reply::Returned { verified };
        }

        if let Some(tokens) = tokens {
            record_tokens(details, tokens);
        }

        let fields = self.prepare_fields(details.to_field_set(), now);
        tracing::debug!(
            merchant_reference = ?fields.get("merchantReference"),
            "Redirecting payer to HPP"
        );

        Reply::PostRedirect {
            url: self.api_endpoint().to_string(),
            fields,
        }
    }

    /// Validate a notification and record its outcome in the details.
    ///
    /// Rejected outcomes are recorded as well; a host that persists
    /// details keeps them only for accepted notifications.
    pub fn notify(&self, details: &mut PaymentDetails, http_request: &FieldSet) -> NotificationOutcome {
        let outcome = notification::validate(
            http_request,
            details.merchant_reference(),
            self.signer(),
            self.config.notification_method,
        );

        details.set(RESPONSE_STATUS, outcome.code());
        if let Some(auth_result) = outcome.auth_result() {
            details.set(AUTH_RESULT, auth_result);
        }

        if outcome.is_accepted() {
            tracing::info!(
                merchant_reference = ?http_request.get("merchantReference"),
                event_code = ?http_request.get("eventCode"),
                auth_result = ?details.auth_result(),
                "Notification accepted"
            );
        } else {
            tracing::warn!(
                merchant_reference = ?http_request.get("merchantReference"),
                code = outcome.code(),
                "Notification rejected"
            );
        }

        outcome
    }

    /// Lifecycle state derived from the details.
    #[must_use]
    pub fn status(&self, details: &PaymentDetails) -> PaymentStatus {
        payment_status(details.response_status(), details.auth_result())
    }
}

/// Store capture and notify tokens in `extraData`, keeping existing ones.
fn record_tokens(details: &mut PaymentDetails, tokens: &CaptureTokens) {
    let mut extra: Map<String, Value> = match details.get_str(EXTRA_DATA) {
        Some(raw) if !raw.is_empty() => serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable extraData");
            Map::new()
        }),
        _ => Map::new(),
    };

    extra
        .entry("capture_token")
        .or_insert_with(|| Value::from(tokens.capture_hash.as_str()));

    if let Some(notify) = &tokens.notify {
        if !extra.contains_key("notify_token") {
            extra.insert("notify_token".into(), Value::from(notify.hash.as_str()));
            details.set("resURL", notify.target_url.as_str());
        }
    }

    details.set(EXTRA_DATA, Value::Object(extra).to_string());
}
