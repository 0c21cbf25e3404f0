//! Gateway options and their validation.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::notification::NotificationMethod;
use crate::signer::{MerchantSigner, SigningKey};

/// Options that must be present and non-empty.
pub const REQUIRED_OPTIONS: [&str; 3] = ["skinCode", "merchantAccount", "hmacKey"];

/// Gateway options as supplied by the operator.
///
/// Keys follow the names used in Adyen gateway configuration documents.
/// Nothing is checked until [`GatewayOptions::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayOptions {
    /// HPP skin code.
    #[serde(rename = "skinCode")]
    pub skin_code: Option<String>,

    /// Merchant account name.
    #[serde(rename = "merchantAccount")]
    pub merchant_account: Option<String>,

    /// Hex-encoded skin HMAC key.
    #[serde(rename = "hmacKey")]
    pub hmac_key: Option<String>,

    /// Whether to use the test environment. Must be a JSON boolean.
    pub sandbox: Option<serde_json::Value>,

    /// `basic` or `hmac`.
    pub notification_method: Option<String>,

    /// Hex-encoded notification HMAC key.
    pub notification_hmac: Option<String>,

    /// Fields applied to every payment request that does not set them.
    pub default_payment_fields: BTreeMap<String, String>,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            skin_code: Some(String::new()),
            merchant_account: Some(String::new()),
            hmac_key: Some(String::new()),
            sandbox: Some(serde_json::Value::Bool(true)),
            notification_method: Some(NotificationMethod::Basic.to_string()),
            notification_hmac: None,
            default_payment_fields: BTreeMap::new(),
        }
    }
}

impl GatewayOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read options from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is malformed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Set the skin code.
    #[must_use]
    pub fn with_skin_code(mut self, skin_code: impl Into<String>) -> Self {
        self.skin_code = Some(skin_code.into());
        self
    }

    /// Set the merchant account.
    #[must_use]
    pub fn with_merchant_account(mut self, account: impl Into<String>) -> Self {
        self.merchant_account = Some(account.into());
        self
    }

    /// Set the hex skin HMAC key.
    #[must_use]
    pub fn with_hmac_key(mut self, key: impl Into<String>) -> Self {
        self.hmac_key = Some(key.into());
        self
    }

    /// Set the sandbox flag.
    #[must_use]
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = Some(serde_json::Value::Bool(sandbox));
        self
    }

    /// Use HMAC notifications with the given hex key.
    #[must_use]
    pub fn with_hmac_notifications(mut self, key: impl Into<String>) -> Self {
        self.notification_method = Some(NotificationMethod::Hmac.to_string());
        self.notification_hmac = Some(key.into());
        self
    }

    /// Add a default payment field.
    #[must_use]
    pub fn with_default_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_payment_fields.insert(name.into(), value.into());
        self
    }

    /// Check the options and decode the keys.
    ///
    /// # Errors
    ///
    /// Fails when a required option is missing or empty, the sandbox flag
    /// is not a boolean, a key is not hex, the notification method is
    /// unknown, or `hmac` notifications have no key.
    pub fn validate(&self) -> Result<GatewayConfig> {
        let missing: Vec<&'static str> = REQUIRED_OPTIONS
            .into_iter()
            .zip([&self.skin_code, &self.merchant_account, &self.hmac_key])
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingRequired(missing));
        }

        let sandbox = self
            .sandbox
            .as_ref()
            .and_then(serde_json::Value::as_bool)
            .ok_or(ConfigError::SandboxNotBoolean)?;

        let notification_method = self
            .notification_method
            .as_deref()
            .map_or(Ok(NotificationMethod::Basic), str::parse)?;

        let payment_key = SigningKey::from_hex("hmacKey", self.hmac_key.as_deref().unwrap_or_default())?;
        let notification_key = self
            .notification_hmac
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|k| SigningKey::from_hex("notification_hmac", k))
            .transpose()?;

        if notification_method == NotificationMethod::Hmac && notification_key.is_none() {
            return Err(ConfigError::MissingNotificationKey);
        }

        Ok(GatewayConfig {
            skin_code: self.skin_code.clone().unwrap_or_default(),
            merchant_account: self.merchant_account.clone().unwrap_or_default(),
            sandbox,
            notification_method,
            default_payment_fields: self.default_payment_fields.clone(),
            signer: MerchantSigner::new(payment_key, notification_key),
        })
    }
}

/// Validated gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HPP skin code.
    pub skin_code: String,
    /// Merchant account name.
    pub merchant_account: String,
    /// Whether the test environment is used.
    pub sandbox: bool,
    /// How notifications are authenticated.
    pub notification_method: NotificationMethod,
    /// Fields applied to every payment request that does not set them.
    pub default_payment_fields: BTreeMap<String, String>,
    /// Signer holding the decoded keys.
    pub signer: MerchantSigner,
}
