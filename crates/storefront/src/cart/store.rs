//! Per-request cart store.
//!
//! `CartStore` owns the session's cart snapshot for the duration of one
//! request. Every mutation intent issues exactly one backend mutation and
//! then re-reads the whole cart, replacing the snapshot. On failure the
//! snapshot and the stored cart id are left untouched.

use petvault_core::{CartId, LineItemId, RegionId, ShippingOptionId, VariantId};
use tower_sessions::Session;
use tower_sessions::session::Id as SessionId;
use tracing::instrument;

use crate::cart::guard::{InFlightGuard, InFlightRegistry, Intent};
use crate::cart::CartError;
use crate::medusa::{Cart, CompleteCartResponse, MedusaClient, Order, UpdateCartInput};
use crate::models::session_keys;

/// Result of placing an order.
#[derive(Debug)]
pub enum PlaceOrderOutcome {
    /// The cart became an order; the stored cart id has been discarded.
    Placed(Box<Order>),
    /// The backend refused to complete the cart (e.g., payment declined).
    Rejected(String),
}

/// Single-writer view of the session's cart.
pub struct CartStore {
    client: MedusaClient,
    session: Session,
    in_flight: InFlightRegistry,
    region_id: RegionId,
    cart: Option<Cart>,
}

impl CartStore {
    /// Load the cart referenced by the session, if any.
    ///
    /// A stored id that no longer resolves is discarded without error; the
    /// next mutation creates a fresh cart. A cart priced in another region
    /// is moved to `region_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or the session store
    /// fails.
    #[instrument(skip_all, fields(region_id = %region_id))]
    pub async fn load(
        client: MedusaClient,
        session: Session,
        in_flight: InFlightRegistry,
        region_id: RegionId,
    ) -> Result<Self, CartError> {
        let mut store = Self {
            client,
            session,
            in_flight,
            region_id,
            cart: None,
        };
        store.refresh().await?;
        store.sync_region().await?;
        Ok(store)
    }

    /// The current snapshot.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// Total units in the cart, 0 when there is no cart.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.as_ref().map_or(0, Cart::item_count)
    }

    /// The client backing this store.
    #[must_use]
    pub const fn client(&self) -> &MedusaClient {
        &self.client
    }

    // =========================================================================
    // Snapshot Maintenance
    // =========================================================================

    async fn stored_cart_id(&self) -> Result<Option<CartId>, CartError> {
        Ok(self.session.get::<CartId>(session_keys::CART_ID).await?)
    }

    /// Re-read the cart from the backend, replacing the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or the session store
    /// fails. A cart that no longer exists is not an error.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), CartError> {
        let Some(cart_id) = self.stored_cart_id().await? else {
            self.cart = None;
            return Ok(());
        };

        match self.client.get_cart(&cart_id).await {
            Ok(cart) => {
                self.cart = Some(cart);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::info!(cart_id = %cart_id, "Stored cart no longer exists, discarding");
                self.session
                    .remove::<CartId>(session_keys::CART_ID)
                    .await?;
                self.cart = None;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn sync_region(&mut self) -> Result<(), CartError> {
        let Some(cart) = &self.cart else {
            return Ok(());
        };
        if cart.region_id.as_ref() == Some(&self.region_id) {
            return Ok(());
        }

        let cart_id = cart.id.clone();
        let input = UpdateCartInput {
            region_id: Some(self.region_id.clone()),
            ..UpdateCartInput::default()
        };
        self.client.update_cart(&cart_id, &input).await?;
        self.reload(&cart_id).await
    }

    async fn reload(&mut self, cart_id: &CartId) -> Result<(), CartError> {
        self.cart = Some(self.client.get_cart(cart_id).await?);
        Ok(())
    }

    /// The existing cart id, or a freshly created cart's id.
    async fn ensure_cart(&mut self) -> Result<CartId, CartError> {
        if self.cart.is_none() {
            // Another request in this session may have created one since load.
            self.refresh().await?;
        }
        if let Some(cart) = &self.cart {
            return Ok(cart.id.clone());
        }

        let cart = self.client.create_cart(&self.region_id).await?;
        self.session
            .insert(session_keys::CART_ID, &cart.id)
            .await?;
        tracing::info!(cart_id = %cart.id, "Created cart");
        let cart_id = cart.id.clone();
        self.cart = Some(cart);
        Ok(cart_id)
    }

    fn require_cart_id(&self) -> Result<CartId, CartError> {
        self.cart
            .as_ref()
            .map(|cart| cart.id.clone())
            .ok_or(CartError::NoCart)
    }

    /// The session's id, storing the session first if it has none yet.
    async fn session_id(&self) -> Result<Option<SessionId>, CartError> {
        if self.session.id().is_none() {
            self.session.save().await?;
        }
        Ok(self.session.id())
    }

    fn acquire_session(
        &self,
        session_id: SessionId,
        intent: Intent,
    ) -> Result<InFlightGuard, CartError> {
        self.in_flight
            .try_acquire_session(session_id, intent)
            .ok_or_else(|| {
                tracing::debug!(intent = intent.as_str(), "Ignoring duplicate request for session");
                CartError::InFlight
            })
    }

    fn acquire(&self, cart_id: &CartId, intent: Intent) -> Result<InFlightGuard, CartError> {
        self.in_flight.try_acquire(cart_id, intent).ok_or_else(|| {
            tracing::debug!(cart_id = %cart_id, intent = intent.as_str(), "Ignoring duplicate request");
            CartError::InFlight
        })
    }

    // =========================================================================
    // Mutation Intents
    // =========================================================================

    /// Add `quantity` units of a variant, creating the cart if needed.
    ///
    /// # Errors
    ///
    /// Returns `InFlight` if an add is already outstanding for this session
    /// or cart, `Invalid` for a zero quantity, or the backend's error.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub async fn add(&mut self, variant_id: &VariantId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::Invalid("Quantity must be at least 1".to_string()));
        }

        // Held across cart creation so a second add cannot create another cart.
        let _session_guard = self
            .session_id()
            .await?
            .map(|session_id| self.acquire_session(session_id, Intent::AddToCart))
            .transpose()?;

        let cart_id = self.ensure_cart().await?;
        let _guard = self.acquire(&cart_id, Intent::AddToCart)?;

        self.client
            .add_line_item(&cart_id, variant_id, quantity)
            .await?;
        self.reload(&cart_id).await
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `NoCart` without a cart, or the backend's error.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_quantity(
        &mut self,
        line_id: &LineItemId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(line_id).await;
        }

        let cart_id = self.require_cart_id()?;
        self.client
            .update_line_item(&cart_id, line_id, quantity)
            .await?;
        self.reload(&cart_id).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `NoCart` without a cart, or the backend's error.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove(&mut self, line_id: &LineItemId) -> Result<(), CartError> {
        let cart_id = self.require_cart_id()?;
        self.client.delete_line_item(&cart_id, line_id).await?;
        self.reload(&cart_id).await
    }

    /// Forget the session's cart. The backend cart is left to expire.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), CartError> {
        self.session
            .remove::<CartId>(session_keys::CART_ID)
            .await?;
        self.cart = None;
        Ok(())
    }

    /// Add a promotion code alongside the codes already applied.
    ///
    /// # Errors
    ///
    /// Returns `InFlight` if a promotion is already being applied, `NoCart`
    /// without a cart, or the backend's error (e.g., unknown code).
    #[instrument(skip(self))]
    pub async fn apply_promotion(&mut self, code: &str) -> Result<(), CartError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(CartError::Invalid("Enter a promotion code".to_string()));
        }

        let cart_id = self.require_cart_id()?;
        let _guard = self.acquire(&cart_id, Intent::ApplyPromotion)?;

        let mut codes = self.cart.as_ref().map(Cart::promotion_codes).unwrap_or_default();
        if !codes.iter().any(|existing| existing.eq_ignore_ascii_case(code)) {
            codes.push(code.to_string());
        }

        self.set_promotions(&cart_id, codes).await
    }

    /// Remove a promotion code by re-applying the remaining codes.
    ///
    /// # Errors
    ///
    /// Returns `NoCart` without a cart, or the backend's error.
    #[instrument(skip(self))]
    pub async fn remove_promotion(&mut self, code: &str) -> Result<(), CartError> {
        let cart_id = self.require_cart_id()?;
        let codes = self
            .cart
            .as_ref()
            .map(Cart::promotion_codes)
            .unwrap_or_default()
            .into_iter()
            .filter(|existing| !existing.eq_ignore_ascii_case(code))
            .collect();

        self.set_promotions(&cart_id, codes).await
    }

    async fn set_promotions(&mut self, cart_id: &CartId, codes: Vec<String>) -> Result<(), CartError> {
        let input = UpdateCartInput {
            promo_codes: Some(codes),
            ..UpdateCartInput::default()
        };
        self.client.update_cart(cart_id, &input).await?;
        self.reload(cart_id).await
    }

    /// Store contact email, addresses and delivery identity on the cart.
    ///
    /// # Errors
    ///
    /// Returns `InFlight` if an address submission is outstanding, `NoCart`
    /// without a cart, or the backend's error.
    #[instrument(skip_all)]
    pub async fn set_address(&mut self, input: &UpdateCartInput) -> Result<(), CartError> {
        let cart_id = self.require_cart_id()?;
        let _guard = self.acquire(&cart_id, Intent::SubmitAddress)?;

        self.client.update_cart(&cart_id, input).await?;
        self.reload(&cart_id).await
    }

    /// Apply a shipping option.
    ///
    /// # Errors
    ///
    /// Returns `NoCart` without a cart, or the backend's error.
    #[instrument(skip(self), fields(option_id = %option_id))]
    pub async fn select_shipping(&mut self, option_id: &ShippingOptionId) -> Result<(), CartError> {
        let cart_id = self.require_cart_id()?;
        self.client.add_shipping_method(&cart_id, option_id).await?;
        self.reload(&cart_id).await
    }

    /// Initialise a payment session unless one already exists.
    ///
    /// # Errors
    ///
    /// Returns `NoCart` without a cart, or the backend's error.
    #[instrument(skip(self))]
    pub async fn ensure_payment_session(&mut self, provider_id: &str) -> Result<(), CartError> {
        let cart = self.cart.as_ref().ok_or(CartError::NoCart)?;
        if cart.has_payment_session() {
            return Ok(());
        }

        let cart_id = cart.id.clone();
        self.client.initiate_payment_session(cart, provider_id).await?;
        self.reload(&cart_id).await
    }

    /// Complete the cart. On success the session forgets the cart.
    ///
    /// # Errors
    ///
    /// Returns `InFlight` if an order is already being placed, `NoCart`
    /// without a cart, or the backend's error.
    #[instrument(skip(self))]
    pub async fn place_order(&mut self) -> Result<PlaceOrderOutcome, CartError> {
        let cart_id = self.require_cart_id()?;
        let _guard = self.acquire(&cart_id, Intent::PlaceOrder)?;

        match self.client.complete_cart(&cart_id).await? {
            CompleteCartResponse::Order { order } => {
                tracing::info!(cart_id = %cart_id, order_id = %order.id, "Order placed");
                self.clear().await?;
                Ok(PlaceOrderOutcome::Placed(order))
            }
            CompleteCartResponse::Cart { error, .. } => {
                let message = error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "Payment could not be completed".to_string());
                tracing::warn!(cart_id = %cart_id, message = %message, "Cart completion rejected");
                self.reload(&cart_id).await?;
                Ok(PlaceOrderOutcome::Rejected(message))
            }
        }
    }

    /// Attach the cart to a signed-in customer.
    ///
    /// # Errors
    ///
    /// Returns the backend's error. Without a cart this is a no-op.
    #[instrument(skip_all)]
    pub async fn transfer_to_customer(&mut self, token: &str) -> Result<(), CartError> {
        let Some(cart) = &self.cart else {
            return Ok(());
        };

        let cart_id = cart.id.clone();
        self.client.transfer_cart(&cart_id, token).await?;
        self.reload(&cart_id).await
    }
}
