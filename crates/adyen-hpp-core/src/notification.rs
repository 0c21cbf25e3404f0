//! Validation of inbound server-to-server notifications.
//!
//! A notification is checked in a fixed order and the first failing
//! check decides the outcome:
//!
//! 1. the notification names a merchant reference (401 otherwise),
//! 2. that reference is the one stored for the payment (402 otherwise),
//! 3. in `hmac` mode, `additionalData.hmacSignature` verifies (403 otherwise).
//!
//! An accepted notification yields the normalized `authResult`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fields::{FieldSet, MERCHANT_REFERENCE};
use crate::signer::MerchantSigner;

/// Event code of an authorisation notification.
pub const EVENT_AUTHORISATION: &str = "AUTHORISATION";

/// How notifications are authenticated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMethod {
    /// No signature check; authenticity is left to the network layer.
    #[default]
    Basic,
    /// `additionalData.hmacSignature` must verify with the notification key.
    Hmac,
}

impl FromStr for NotificationMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "hmac" => Ok(Self::Hmac),
            other => Err(ConfigError::UnknownNotificationMethod(other.to_string())),
        }
    }
}

impl fmt::Display for NotificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Basic => "basic",
            Self::Hmac => "hmac",
        })
    }
}

/// Result of validating a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// All checks passed.
    Accepted {
        /// Normalized result to store, or `None` to keep the stored one.
        auth_result: Option<String>,
    },
    /// The notification carries no merchant reference.
    MissingReference,
    /// The merchant reference does not match the stored one.
    ReferenceMismatch,
    /// The HMAC signature is missing or wrong.
    SignatureInvalid,
}

impl NotificationOutcome {
    /// The status code reported back to the caller.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Accepted { .. } => 200,
            Self::MissingReference => 401,
            Self::ReferenceMismatch => 402,
            Self::SignatureInvalid => 403,
        }
    }

    /// Whether the notification was accepted.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// The normalized `authResult`, when accepted with one.
    #[must_use]
    pub fn auth_result(&self) -> Option<&str> {
        match self {
            Self::Accepted { auth_result } => auth_result.as_deref(),
            _ => None,
        }
    }
}

/// Run the notification checks against the stored merchant reference.
#[must_use]
pub fn validate(
    inbound: &FieldSet,
    stored_reference: Option<&str>,
    signer: &MerchantSigner,
    method: NotificationMethod,
) -> NotificationOutcome {
    let Some(reference) = inbound.non_empty(MERCHANT_REFERENCE) else {
        return NotificationOutcome::MissingReference;
    };

    if stored_reference != Some(reference) {
        return NotificationOutcome::ReferenceMismatch;
    }

    if method == NotificationMethod::Hmac && !signer.verify_notification(inbound) {
        return NotificationOutcome::SignatureInvalid;
    }

    NotificationOutcome::Accepted {
        auth_result: derive_auth_result(inbound),
    }
}

/// Map a notification's event code to an `authResult`.
///
/// Without an `eventCode` an explicit `authResult` on the notification is
/// passed through; otherwise nothing is derived.
#[must_use]
pub fn derive_auth_result(inbound: &FieldSet) -> Option<String> {
    let Some(event_code) = inbound.get("eventCode") else {
        return inbound.non_empty("authResult").map(str::to_string);
    };

    if event_code == EVENT_AUTHORISATION {
        if inbound.get("success") == Some("true") {
            return Some("AUTHORISED".to_string());
        }
        if inbound.non_empty("reason").is_some() {
            return Some("REFUSED".to_string());
        }
    }

    Some(event_code.to_string())
}
