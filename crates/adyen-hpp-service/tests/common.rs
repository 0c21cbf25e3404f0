//! Common test utilities for adyen-hpp integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use axum::Router;
use axum_test::TestServer;
use serde_json::json;

use adyen_hpp_core::{AdyenGateway, Catalog, FieldSet, GatewayOptions, KeySelector};
use adyen_hpp_service::{create_router, AppState, ServiceConfig};

/// Payment key used by the test gateway.
pub const HMAC_KEY: &str = "4468D9782DEF54FCD706C9100C71EC43932B1EBC2ACF6BA0560C05AAA7550C48";

/// Notification key used when hmac notifications are enabled.
pub const NOTIFICATION_KEY: &str = "0A1B2C3D4E5F60718293A4B5C6D7E8F90A1B2C3D4E5F60718293A4B5C6D7E8F9";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// A gateway with the same options, for signing test payloads.
    pub gateway: AdyenGateway,
}

impl TestHarness {
    /// Create a harness with basic notification verification.
    pub fn new() -> Self {
        Self::with_options(base_options())
    }

    /// Create a harness that verifies notification HMAC signatures.
    pub fn with_hmac_notifications() -> Self {
        Self::with_options(base_options().with_hmac_notifications(NOTIFICATION_KEY))
    }

    /// Create a harness from explicit gateway options.
    pub fn with_options(options: GatewayOptions) -> Self {
        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            public_url: "http://shop.test".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
            gateway: options.clone(),
        };

        let state = AppState::in_memory(config).expect("Failed to build app state");
        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");
        let gateway = AdyenGateway::new(&options).expect("Failed to build gateway");

        Self { server, gateway }
    }

    /// Create a payment and return its id.
    pub async fn create_payment(&self, number: &str) -> String {
        let response = self
            .server
            .post("/v1/payments")
            .json(&json!({
                "number": number,
                "total_amount": 1250,
                "currency_code": "EUR",
                "client_email": "payer@example.com",
                "client_id": "client-7"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        body["id"].as_str().expect("id missing").to_string()
    }

    /// Sign a payer return the way Adyen does and attach `merchantSig`.
    pub fn signed_return(&self, fields: FieldSet) -> FieldSet {
        let sig = self
            .gateway
            .signer()
            .sign(&fields, Catalog::Response, KeySelector::Notification);
        fields.with_field("merchantSig", sig)
    }

    /// Sign a notification and attach `additionalData.hmacSignature`.
    pub fn signed_notification(&self, fields: FieldSet) -> FieldSet {
        let sig = self
            .gateway
            .signer()
            .sign(&fields, Catalog::Notification, KeySelector::Notification);
        fields.with_field("additionalData.hmacSignature", sig)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for a sandbox gateway with basic notifications.
pub fn base_options() -> GatewayOptions {
    GatewayOptions::new()
        .with_skin_code("skin123")
        .with_merchant_account("TestMerchant")
        .with_hmac_key(HMAC_KEY)
        .with_sandbox(true)
}
