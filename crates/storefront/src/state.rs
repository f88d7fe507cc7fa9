//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::Session;

use crate::cart::{CartError, CartStore, InFlightRegistry};
use crate::config::StorefrontConfig;
use crate::medusa::{MedusaClient, Region};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the commerce client and the in-flight registry.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    medusa: MedusaClient,
    in_flight: InFlightRegistry,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let medusa = MedusaClient::new(&config.medusa);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                medusa,
                in_flight: InFlightRegistry::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce backend client.
    #[must_use]
    pub fn medusa(&self) -> &MedusaClient {
        &self.inner.medusa
    }

    /// Get a reference to the in-flight mutation registry.
    #[must_use]
    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.inner.in_flight
    }

    /// Build the cart store for this request's session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or the session store
    /// fails.
    pub async fn cart_store(&self, session: Session, region: &Region) -> Result<CartStore, CartError> {
        CartStore::load(
            self.medusa().clone(),
            session,
            self.in_flight().clone(),
            region.id.clone(),
        )
        .await
    }
}
