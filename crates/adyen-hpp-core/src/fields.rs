//! Field sets and the HPP field catalog.
//!
//! Every field the integration knows about is listed once in [`FIELDS`],
//! tagged with the places it is used. The named [`Catalog`]s are views
//! over that table, so the request, response and notification lists can
//! never drift apart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Reserved field names
// ============================================================================

/// Field carrying the signature of a payment request or return.
pub const MERCHANT_SIG: &str = "merchantSig";

/// Field carrying the signature of a notification.
pub const HMAC_SIGNATURE: &str = "additionalData.hmacSignature";

/// Field carrying the merchant's own payment reference.
pub const MERCHANT_REFERENCE: &str = "merchantReference";

/// How a field takes part in an outbound payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Must be present and non-empty; signed.
    Required,
    /// May be present; signed.
    Optional,
    /// May be present; sent but not signed.
    Other,
}

/// A single entry of the field catalog.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Wire name of the field.
    pub name: &'static str,
    /// Role in the outbound payment request, if any.
    pub request: Option<RequestClass>,
    /// Signed in the payer's return redirect.
    pub response: bool,
    /// Signed in a server-to-server notification.
    pub notification: bool,
}

const fn field(
    name: &'static str,
    request: Option<RequestClass>,
    response: bool,
    notification: bool,
) -> FieldDef {
    FieldDef {
        name,
        request,
        response,
        notification,
    }
}

use RequestClass::{Optional, Other, Required};

/// Every field known to the integration.
pub const FIELDS: &[FieldDef] = &[
    // Payment request, required
    field("merchantReference", Some(Required), true, true),
    field("paymentAmount", Some(Required), false, false),
    field("currencyCode", Some(Required), false, false),
    field("shipBeforeDate", Some(Required), false, false),
    field("skinCode", Some(Required), true, false),
    field("merchantAccount", Some(Required), false, false),
    field("sessionValidity", Some(Required), false, false),
    field("shopperEmail", Some(Required), false, false),
    // Payment request, optional
    field("merchantReturnData", Some(Optional), true, false),
    field("shopperReference", Some(Optional), false, false),
    field("allowedMethods", Some(Optional), false, false),
    field("blockedMethods", Some(Optional), false, false),
    field("offset", Some(Optional), false, false),
    field("shopperStatement", Some(Optional), false, false),
    field("recurringContract", Some(Optional), false, false),
    field("billingAddressType", Some(Optional), false, false),
    field("deliveryAddressType", Some(Optional), false, false),
    field("resURL", Some(Optional), false, false),
    // Payment request, other
    field("brandCode", Some(Other), false, false),
    field("countryCode", Some(Other), false, false),
    field("shopperLocale", Some(Other), true, false),
    field("orderData", Some(Other), false, false),
    field("offerEmail", Some(Other), false, false),
    field("issuerId", Some(Other), false, false),
    // Return redirect
    field("authResult", None, true, false),
    field("pspReference", None, true, true),
    field("paymentMethod", None, true, false),
    // Notification
    field("originalReference", None, false, true),
    field("merchantAccountCode", None, false, true),
    field("amount.value", None, false, true),
    field("amount.currency", None, false, true),
    field("eventCode", None, false, true),
    field("success", None, false, true),
];

/// A named view over [`FIELDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    /// Required payment request fields.
    Required,
    /// Fields signed in a payment request (required and optional).
    PaymentSigning,
    /// Fields accepted in a payment request (required, optional and other).
    PaymentSupported,
    /// Fields signed in the payer's return redirect.
    Response,
    /// Fields signed in a notification.
    Notification,
}

impl Catalog {
    /// Whether the given field definition belongs to this catalog.
    #[must_use]
    pub fn includes(self, def: &FieldDef) -> bool {
        match self {
            Self::Required => def.request == Some(Required),
            Self::PaymentSigning => matches!(def.request, Some(Required | Optional)),
            Self::PaymentSupported => def.request.is_some(),
            Self::Response => def.response,
            Self::Notification => def.notification,
        }
    }

    /// Field names of this catalog, in table order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        FIELDS
            .iter()
            .filter(|def| self.includes(def))
            .map(|def| def.name)
            .collect()
    }

    /// Whether `name` belongs to this catalog.
    #[must_use]
    pub fn contains(self, name: &str) -> bool {
        FIELDS
            .iter()
            .any(|def| def.name == name && self.includes(def))
    }
}

// ============================================================================
// FieldSet
// ============================================================================

/// An immutable mapping of field name to scalar value.
///
/// Numbers are carried in their decimal string form, exactly as they
/// appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet(BTreeMap<String, String>);

impl FieldSet {
    /// An empty field set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a field set.
    #[must_use]
    pub fn builder() -> FieldSetBuilder {
        FieldSetBuilder::default()
    }

    /// Value of `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of `name`, if present and non-empty.
    #[must_use]
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Names in `catalog` that are absent or empty here, in table order.
    #[must_use]
    pub fn missing(&self, catalog: Catalog) -> Vec<&'static str> {
        catalog
            .names()
            .into_iter()
            .filter(|name| self.non_empty(name).is_none())
            .collect()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return a copy with `name` set to `value`.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Reopen this set for editing.
    #[must_use]
    pub fn into_builder(self) -> FieldSetBuilder {
        FieldSetBuilder { fields: self.0 }
    }
}

impl<K, V> FromIterator<(K, V)> for FieldSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FieldSet {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Mutable staging area for a [`FieldSet`].
#[derive(Debug, Clone, Default)]
pub struct FieldSetBuilder {
    fields: BTreeMap<String, String>,
}

impl FieldSetBuilder {
    /// Set `name`, replacing any previous value.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set `name` only when it is missing or empty.
    #[must_use]
    pub fn set_default(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let entry = self.fields.entry(name.into()).or_default();
        if entry.is_empty() {
            *entry = value.into();
        }
        self
    }

    /// Fill every missing or empty field from `defaults`.
    #[must_use]
    pub fn merge_defaults<'a, I>(self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        defaults
            .into_iter()
            .fold(self, |builder, (k, v)| builder.set_default(k.clone(), v.clone()))
    }

    /// Keep only fields in `catalog` whose value is non-empty.
    #[must_use]
    pub fn retain_catalog(mut self, catalog: Catalog) -> Self {
        self.fields
            .retain(|k, v| !v.is_empty() && catalog.contains(k));
        self
    }

    /// Freeze the set.
    #[must_use]
    pub fn build(self) -> FieldSet {
        FieldSet(self.fields)
    }
}
