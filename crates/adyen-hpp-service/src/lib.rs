//! Adyen HPP HTTP service.
//!
//! This crate hosts the [`adyen_hpp_core`] gateway behind an HTTP API:
//!
//! - Payment creation and status
//! - Hand-off to the hosted payment page and the payer's signed return
//! - Adyen server-to-server notifications
//!
//! Payment details are kept in a [`DetailsStore`]; the bundled
//! [`MemoryStore`] keeps them in process memory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod store;

pub use config::{options_from_lookup, ServiceConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
pub use store::{DetailsStore, MemoryStore, PaymentId};
