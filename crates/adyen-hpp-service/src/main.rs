//! Adyen HPP Service - HTTP host for the Adyen hosted payment page gateway
//!
//! This is the main entry point for the adyen-hpp service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adyen_hpp_service::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,adyen_hpp=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Adyen HPP Service");

    let config = ServiceConfig::from_env()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        public_url = %config.public_url,
        merchant_account = ?config.gateway.merchant_account,
        "Service configuration loaded"
    );

    // Misconfigured gateway options abort startup
    let state = AppState::in_memory(config.clone())?;

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
