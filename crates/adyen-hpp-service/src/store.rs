//! Payment details storage.
//!
//! The gateway treats storage as the host's concern; this module provides
//! the trait the handlers use and an in-memory implementation.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use adyen_hpp_core::PaymentDetails;

/// Identifier of a stored payment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(uuid::Uuid);

impl PaymentId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Debug for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PaymentId({})", self.0)
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Change applied to stored details.
///
/// It edits a draft and returns whether the draft should be kept.
pub type DetailsUpdate<'a> = Box<dyn FnOnce(&mut PaymentDetails) -> bool + Send + 'a>;

/// Storage for payment details.
#[async_trait]
pub trait DetailsStore: Send + Sync {
    /// Store details under a new identifier.
    async fn insert(&self, details: PaymentDetails) -> PaymentId;

    /// Fetch a copy of the details.
    async fn get(&self, id: &PaymentId) -> Option<PaymentDetails>;

    /// Run `update` on a draft of the details and keep the draft when it
    /// returns `true`. No other update of the same payment interleaves.
    ///
    /// Returns `false`, without calling `update`, if the payment does not
    /// exist.
    async fn update(&self, id: &PaymentId, update: DetailsUpdate<'_>) -> bool;
}

/// Details kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    payments: RwLock<HashMap<PaymentId, PaymentDetails>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DetailsStore for MemoryStore {
    async fn insert(&self, details: PaymentDetails) -> PaymentId {
        let id = PaymentId::generate();
        self.payments.write().await.insert(id, details);
        id
    }

    async fn get(&self, id: &PaymentId) -> Option<PaymentDetails> {
        self.payments.read().await.get(id).cloned()
    }

    async fn update(&self, id: &PaymentId, update: DetailsUpdate<'_>) -> bool {
        let mut payments = self.payments.write().await;
        let Some(slot) = payments.get_mut(id) else {
            return false;
        };

        let mut draft = slot.clone();
        if update(&mut draft) {
            *slot = draft;
        }
        true
    }
}
