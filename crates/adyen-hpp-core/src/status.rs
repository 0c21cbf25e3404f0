//! Mapping of Adyen results onto the generic payment lifecycle.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a payment as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing has happened yet.
    New,
    /// Awaiting a final result.
    Pending,
    /// Funds are authorised.
    Authorized,
    /// Funds are captured.
    Captured,
    /// The payment was cancelled.
    Canceled,
    /// The authorisation expired.
    Expired,
    /// The payment was refunded.
    Refunded,
    /// A chargeback is in progress.
    Suspended,
    /// The payment failed or was refused.
    Failed,
    /// The result is not recognized.
    Unknown,
}

/// Derive the lifecycle state from the stored response status and `authResult`.
///
/// A non-2xx response status means failure whatever the `authResult`.
#[must_use]
pub fn payment_status(response_status: Option<i64>, auth_result: Option<&str>) -> PaymentStatus {
    if response_status.is_some_and(|code| !(200..=299).contains(&code)) {
        return PaymentStatus::Failed;
    }

    match auth_result.unwrap_or_default() {
        "" => PaymentStatus::New,
        "AUTHORISED" => PaymentStatus::Authorized,
        "PENDING" => PaymentStatus::Pending,
        "CAPTURE" => PaymentStatus::Captured,
        "CANCELLED" => PaymentStatus::Canceled,
        "EXPIRE" => PaymentStatus::Expired,
        "REFUND" => PaymentStatus::Refunded,
        "CHARGEBACK" => PaymentStatus::Suspended,
        "REFUSED" | "ERROR" => PaymentStatus::Failed,
        _ => PaymentStatus::Unknown,
    }
}
