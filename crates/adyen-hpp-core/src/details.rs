//! The host's key-value record of an in-progress payment.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fields::FieldSet;

/// Key holding the last status code reported for the payment.
pub const RESPONSE_STATUS: &str = "response_status";

/// Key holding the normalized Adyen result.
pub const AUTH_RESULT: &str = "authResult";

/// Key holding host tokens as a JSON document.
pub const EXTRA_DATA: &str = "extraData";

/// Mutable payment details owned by the host.
///
/// Values are arbitrary JSON; only scalars take part in signing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentDetails(Map<String, Value>);

impl PaymentDetails {
    /// Empty details.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of `key`, if it is a JSON string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Integer value of `key`, if it is a JSON integer.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    /// Set `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// The stored merchant reference.
    #[must_use]
    pub fn merchant_reference(&self) -> Option<&str> {
        self.get_str(crate::fields::MERCHANT_REFERENCE)
    }

    /// The stored `authResult`.
    #[must_use]
    pub fn auth_result(&self) -> Option<&str> {
        self.get_str(AUTH_RESULT)
    }

    /// The stored `response_status`.
    #[must_use]
    pub fn response_status(&self) -> Option<i64> {
        self.get_i64(RESPONSE_STATUS)
    }

    /// Scalar values as wire fields.
    ///
    /// Strings are taken as is, numbers and booleans in their JSON form;
    /// nulls, arrays and objects are skipped.
    #[must_use]
    pub fn to_field_set(&self) -> FieldSet {
        self.0
            .iter()
            .filter_map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null | Value::Array(_) | Value::Object(_) => return None,
                };
                Some((k.clone(), value))
            })
            .collect()
    }

    /// Copy every field of `fields` into the details as strings.
    pub fn extend_from(&mut self, fields: &FieldSet) {
        for (k, v) in fields.iter() {
            self.set(k, v);
        }
    }
}

impl From<Map<String, Value>> for PaymentDetails {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
