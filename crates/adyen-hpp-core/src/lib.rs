//! Adyen hosted payment page (HPP) gateway core.
//!
//! This crate holds the protocol-sensitive part of the Adyen HPP integration:
//!
//! - **Fields**: `FieldSet`, `FieldSetBuilder` and the field `Catalog`
//! - **Canonicalization**: the signing string Adyen computes its HMAC over
//! - **Signing**: `MerchantSigner` with `sign`/`verify` over a `SigningKey`
//! - **Notifications**: `validate` producing a `NotificationOutcome`
//! - **Status**: mapping Adyen results to a `PaymentStatus`
//! - **Gateway**: `AdyenGateway` executing `GatewayRequest`s
//!
//! # Signing string
//!
//! Non-empty catalog fields are sorted by name, every name and value has
//! `\` and `:` escaped, and the string is all names followed by all
//! values, joined by `:`. The HMAC-SHA256 of that string, keyed with the
//! hex-decoded secret, is sent base64-encoded as `merchantSig`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod canonical;
pub mod config;
pub mod crypto;
pub mod details;
pub mod error;
pub mod fields;
pub mod gateway;
pub mod notification;
pub mod payment;
pub mod signer;
pub mod status;

pub use canonical::{canonicalize, escape};
pub use config::{GatewayConfig, GatewayOptions, REQUIRED_OPTIONS};
pub use details::{PaymentDetails, AUTH_RESULT, EXTRA_DATA, RESPONSE_STATUS};
pub use error::{ConfigError, Result};
pub use fields::{
    Catalog, FieldDef, FieldSet, FieldSetBuilder, RequestClass, FIELDS, HMAC_SIGNATURE,
    MERCHANT_REFERENCE, MERCHANT_SIG,
};
pub use gateway::{
    AdyenGateway, CaptureTokens, GatewayRequest, HostedPaymentRequest, NotifyToken, Reply,
    LIVE_ENDPOINT, SANDBOX_ENDPOINT,
};
pub use notification::{validate, NotificationMethod, NotificationOutcome};
pub use payment::{Payment, PaymentMethodPreset};
pub use signer::{KeySelector, MerchantSigner, Signature, SigningKey};
pub use status::{payment_status, PaymentStatus};
