//! Adyen notification webhook integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::Value;

use adyen_hpp_core::FieldSet;

fn authorisation(reference: &str) -> FieldSet {
    FieldSet::builder()
        .set("merchantReference", reference)
        .set("pspReference", "8814000000000002")
        .set("merchantAccountCode", "TestMerchant")
        .set("amount.value", "1250")
        .set("amount.currency", "EUR")
        .set("eventCode", "AUTHORISATION")
        .set("success", "true")
        .build()
}

async fn status_of(harness: &TestHarness, id: &str) -> Value {
    harness
        .server
        .get(&format!("/v1/payments/{id}/status"))
        .await
        .json::<Value>()["status"]
        .clone()
}

// ============================================================================
// Basic verification
// ============================================================================

#[tokio::test]
async fn accepted_notification_authorises_payment() {
    let harness = TestHarness::new();
    let id = harness.create_payment("order-1").await;

    let response = harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&authorisation("order-1"))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "[accepted]");
    assert_eq!(status_of(&harness, &id).await, "authorized");
}

#[tokio::test]
async fn refused_authorisation_fails_payment() {
    let harness = TestHarness::new();
    let id = harness.create_payment("order-2").await;
    let fields = authorisation("order-2")
        .with_field("success", "false")
        .with_field("reason", "Refused");

    let response = harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&fields)
        .await;

    response.assert_status_ok();
    assert_eq!(status_of(&harness, &id).await, "failed");
}

#[tokio::test]
async fn capture_event_marks_payment_captured() {
    let harness = TestHarness::new();
    let id = harness.create_payment("order-3").await;
    let fields = authorisation("order-3").with_field("eventCode", "CAPTURE");

    harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&fields)
        .await
        .assert_status_ok();

    assert_eq!(status_of(&harness, &id).await, "captured");
}

#[tokio::test]
async fn missing_reference_is_401() {
    let harness = TestHarness::new();
    let id = harness.create_payment("order-4").await;
    let fields = FieldSet::builder().set("eventCode", "AUTHORISATION").build();

    let response = harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&fields)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.text(), "");
}

#[tokio::test]
async fn reference_mismatch_is_402() {
    let harness = TestHarness::new();
    let id = harness.create_payment("order-5").await;

    let response = harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&authorisation("someone-else"))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    assert_eq!(status_of(&harness, &id).await, "new");
}

#[tokio::test]
async fn unknown_payment_is_402() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/webhooks/adyen/6f1c1e9a-3f65-4c1e-9a53-0e2f3c3f8e11")
        .form(&authorisation("order-6"))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
}

// ============================================================================
// HMAC verification
// ============================================================================

#[tokio::test]
async fn signed_notification_is_accepted() {
    let harness = TestHarness::with_hmac_notifications();
    let id = harness.create_payment("order-7").await;
    let fields = harness.signed_notification(authorisation("order-7"));

    let response = harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&fields)
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "[accepted]");
    assert_eq!(status_of(&harness, &id).await, "authorized");
}

#[tokio::test]
async fn unsigned_notification_is_403() {
    let harness = TestHarness::with_hmac_notifications();
    let id = harness.create_payment("order-8").await;

    let response = harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&authorisation("order-8"))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(status_of(&harness, &id).await, "new");
}

#[tokio::test]
async fn tampered_notification_is_403() {
    let harness = TestHarness::with_hmac_notifications();
    let id = harness.create_payment("order-9").await;
    let fields = harness
        .signed_notification(authorisation("order-9"))
        .with_field("amount.value", "1");

    let response = harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&fields)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reference_is_checked_before_signature() {
    let harness = TestHarness::with_hmac_notifications();
    let id = harness.create_payment("order-10").await;

    let response = harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&authorisation("order-11"))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
}

// ============================================================================
// Rejected notifications leave stored state alone
// ============================================================================

#[tokio::test]
async fn forged_notification_cannot_fail_authorised_payment() {
    let harness = TestHarness::with_hmac_notifications();
    let id = harness.create_payment("order-12").await;

    harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&harness.signed_notification(authorisation("order-12")))
        .await
        .assert_status_ok();
    assert_eq!(status_of(&harness, &id).await, "authorized");

    let forged = FieldSet::builder().set("merchantReference", "nope").build();
    harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&forged)
        .await
        .assert_status(StatusCode::PAYMENT_REQUIRED);

    let unsigned = authorisation("order-12")
        .with_field("success", "false")
        .with_field("reason", "Refused");
    harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&unsigned)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    assert_eq!(status_of(&harness, &id).await, "authorized");
}

#[tokio::test]
async fn missing_reference_leaves_payment_unchanged() {
    let harness = TestHarness::new();
    let id = harness.create_payment("order-13").await;

    harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&authorisation("order-13"))
        .await
        .assert_status_ok();

    harness
        .server
        .post(&format!("/webhooks/adyen/{id}"))
        .form(&FieldSet::builder().set("eventCode", "CANCELLATION").build())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    assert_eq!(status_of(&harness, &id).await, "authorized");
}

#[tokio::test]
async fn concurrent_return_and_notification_both_succeed() {
    let harness = TestHarness::new();
    let id = harness.create_payment("order-14").await;

    let query = harness.signed_return(
        FieldSet::builder()
            .set("authResult", "AUTHORISED")
            .set("pspReference", "8814000000000003")
            .set("merchantReference", "order-14")
            .set("skinCode", "skin123")
            .set("paymentMethod", "visa")
            .build(),
    );
    let notification = authorisation("order-14").with_field("eventCode", "CAPTURE");
    let return_path = format!("/v1/payments/{id}/return");
    let webhook_path = format!("/webhooks/adyen/{id}");

    let (returned, notified) = tokio::join!(
        async { harness.server.get(&return_path).add_query_params(&query).await },
        async { harness.server.post(&webhook_path).form(&notification).await },
    );
    returned.assert_status_ok();
    notified.assert_status_ok();

    // The later update decides authResult.
    let status = status_of(&harness, &id).await;
    assert!(status == "authorized" || status == "captured", "{status}");
}
