//! Signing and verification of HPP field sets.

use std::fmt;

use crate::canonical::canonicalize;
use crate::crypto::{constant_time_eq, hmac_sha256_base64};
use crate::error::ConfigError;
use crate::fields::{Catalog, FieldSet, HMAC_SIGNATURE, MERCHANT_SIG};

/// A decoded HMAC secret.
///
/// Configured as hex and decoded once; the raw bytes are the HMAC key.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Decode a hex-encoded secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKey`] if `hex` is not valid hex.
    pub fn from_hex(option: &'static str, hex: &str) -> Result<Self, ConfigError> {
        hex::decode(hex.trim())
            .map(Self)
            .map_err(|source| ConfigError::InvalidKey { option, source })
    }

    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey(<{} bytes redacted>)", self.0.len())
    }
}

/// Which configured secret to sign with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySelector {
    /// The skin's `hmacKey`.
    Payment,
    /// The `notification_hmac` key.
    Notification,
}

/// A base64-encoded HMAC-SHA256 signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(String);

impl Signature {
    /// The encoded signature.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a received signature without short-circuiting.
    #[must_use]
    pub fn matches(&self, received: &str) -> bool {
        constant_time_eq(&self.0, received)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Signature> for String {
    fn from(sig: Signature) -> Self {
        sig.0
    }
}

/// Signs and verifies field sets with the configured secrets.
///
/// Holds only immutable key material and may be shared freely between
/// threads.
#[derive(Debug, Clone)]
pub struct MerchantSigner {
    payment_key: SigningKey,
    notification_key: Option<SigningKey>,
}

impl MerchantSigner {
    /// Create a signer from the payment key and an optional notification key.
    #[must_use]
    pub fn new(payment_key: SigningKey, notification_key: Option<SigningKey>) -> Self {
        Self {
            payment_key,
            notification_key,
        }
    }

    /// Whether a dedicated notification key is configured.
    #[must_use]
    pub fn has_notification_key(&self) -> bool {
        self.notification_key.is_some()
    }

    // Single-key deployments sign returns with the skin key.
    fn key(&self, selector: KeySelector) -> &SigningKey {
        match selector {
            KeySelector::Payment => &self.payment_key,
            KeySelector::Notification => {
                self.notification_key.as_ref().unwrap_or(&self.payment_key)
            }
        }
    }

    /// Sign the `catalog` fields of `fields` with the selected key.
    #[must_use]
    pub fn sign(&self, fields: &FieldSet, catalog: Catalog, key: KeySelector) -> Signature {
        let message = canonicalize(fields, &catalog.names(), true);
        Signature(hmac_sha256_base64(self.key(key).as_bytes(), &message))
    }

    /// Sign an outbound payment request.
    #[must_use]
    pub fn merchant_sig(&self, fields: &FieldSet) -> Signature {
        self.sign(fields, Catalog::PaymentSigning, KeySelector::Payment)
    }

    /// Check the signature stored under `signature_field`.
    ///
    /// Fails closed: a missing or empty signature, or any difference from
    /// the computed one, yields `false`.
    #[must_use]
    pub fn verify(
        &self,
        fields: &FieldSet,
        signature_field: &str,
        catalog: Catalog,
        key: KeySelector,
    ) -> bool {
        let Some(received) = fields.non_empty(signature_field) else {
            return false;
        };

        self.sign(fields, catalog, key).matches(received)
    }

    /// Verify `merchantSig` of a signed payment request.
    #[must_use]
    pub fn verify_sign(&self, fields: &FieldSet) -> bool {
        self.verify(fields, MERCHANT_SIG, Catalog::PaymentSigning, KeySelector::Payment)
    }

    /// Verify `merchantSig` of the payer's return redirect.
    #[must_use]
    pub fn verify_response(&self, fields: &FieldSet) -> bool {
        self.verify(fields, MERCHANT_SIG, Catalog::Response, KeySelector::Notification)
    }

    /// Verify `additionalData.hmacSignature` of a notification.
    #[must_use]
    pub fn verify_notification(&self, fields: &FieldSet) -> bool {
        self.verify(
            fields,
            HMAC_SIGNATURE,
            Catalog::Notification,
            KeySelector::Notification,
        )
    }
}
