//! Application state.

use std::sync::Arc;

use adyen_hpp_core::{AdyenGateway, ConfigError};

use crate::config::ServiceConfig;
use crate::store::{DetailsStore, MemoryStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Payment details storage.
    pub store: Arc<dyn DetailsStore>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// The configured Adyen gateway.
    pub gateway: Arc<AdyenGateway>,
}

impl AppState {
    /// Create the application state, validating the gateway options.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway options are unusable.
    pub fn new(store: Arc<dyn DetailsStore>, config: ServiceConfig) -> Result<Self, ConfigError> {
        let gateway = AdyenGateway::new(&config.gateway)?;

        tracing::info!(
            endpoint = %gateway.api_endpoint(),
            notification_method = %gateway.config().notification_method,
            "Adyen gateway enabled"
        );

        Ok(Self {
            store,
            config,
            gateway: Arc::new(gateway),
        })
    }

    /// Create the application state with an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway options are unusable.
    pub fn in_memory(config: ServiceConfig) -> Result<Self, ConfigError> {
        Self::new(Arc::new(MemoryStore::new()), config)
    }
}
