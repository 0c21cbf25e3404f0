//! Generic payment model and payment method presets.

use serde::{Deserialize, Serialize};

use crate::fields::FieldSet;

/// A payment as the host models it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Merchant's order number.
    pub number: String,
    /// Total in minor units.
    pub total_amount: i64,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Payer's email address.
    #[serde(default)]
    pub client_email: Option<String>,
    /// Payer's identifier in the merchant's system.
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Payment method shortcuts that narrow the methods offered on the HPP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodPreset {
    /// Bancontact / Mister Cash, Belgium.
    AdyenMisterCash,
    /// Sofort direct banking, Germany.
    AdyenDirectEbanking,
    /// Giropay, Germany.
    AdyenGiropay,
    /// American Express, Visa and Mastercard.
    AdyenCreditCard,
}

impl PaymentMethodPreset {
    /// Look up a preset by its host-side name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "adyen_mister_cash" => Some(Self::AdyenMisterCash),
            "adyen_direct_ebanking" => Some(Self::AdyenDirectEbanking),
            "adyen_giropay" => Some(Self::AdyenGiropay),
            "adyen_credit_card" => Some(Self::AdyenCreditCard),
            _ => None,
        }
    }

    /// Value for `allowedMethods`.
    #[must_use]
    pub const fn allowed_methods(self) -> &'static str {
        match self {
            Self::AdyenMisterCash => "bcmc",
            Self::AdyenDirectEbanking => "directEbanking",
            Self::AdyenGiropay => "giropay",
            Self::AdyenCreditCard => "amex,visa,mc",
        }
    }

    /// Value for `countryCode`, where the method is country-bound.
    #[must_use]
    pub const fn country_code(self) -> Option<&'static str> {
        match self {
            Self::AdyenMisterCash => Some("BE"),
            Self::AdyenDirectEbanking | Self::AdyenGiropay => Some("DE"),
            Self::AdyenCreditCard => None,
        }
    }

    /// Request fields that narrow the HPP to this method.
    #[must_use]
    pub fn fields(self) -> FieldSet {
        let fields = FieldSet::new().with_field("allowedMethods", self.allowed_methods());
        match self.country_code() {
            Some(country) => fields.with_field("countryCode", country),
            None => fields,
        }
    }
}
