//! Shopping session
//!
//! Owns the cart and wishlist for one shopper, borrows the catalog, and writes a snapshot
//! through a [`SnapshotStore`] after every change. In-memory state is authoritative:
//! snapshot failures are retried, logged, and kept for the caller to inspect, but never
//! undo or block a mutation.

use std::fmt;

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    cart::{CartLedger, LedgerError, LineChange, ResolvedLine},
    catalog::Catalog,
    config::PersistenceConfig,
    persistence::{
        CART_KEY, CartSnapshot, Persisted, SnapshotStore, StoreError, WISHLIST_KEY,
        WishlistSnapshot,
    },
    pricing::{CheckoutSummary, DeliveryTier, PricingError, summarize},
    products::Product,
    wishlist::Wishlist,
};

/// Direction of a snapshot transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOperation {
    /// Reading a snapshot back at restore
    Load,

    /// Writing a snapshot after a mutation
    Save,
}

impl fmt::Display for SnapshotOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotOperation::Load => f.write_str("load"),
            SnapshotOperation::Save => f.write_str("persist"),
        }
    }
}

/// A snapshot that could not be loaded or written.
#[derive(Debug, Error)]
#[error("Failed to {operation} {key} after {attempts} attempt(s): {source}")]
pub struct PersistenceFailure {
    /// Whether the snapshot was being loaded or saved
    pub operation: SnapshotOperation,

    /// Storage key of the snapshot
    pub key: &'static str,

    /// Attempts made before giving up
    pub attempts: u32,

    /// Error from the final attempt
    #[source]
    pub source: StoreError,
}

/// Cart and wishlist state for one shopper.
#[derive(Debug)]
pub struct ShoppingSession<'c, 'a, S> {
    catalog: &'c Catalog<'a>,
    cart: CartLedger,
    wishlist: Wishlist,
    store: S,
    max_attempts: u32,
    last_persistence_error: Option<PersistenceFailure>,
}

impl<'c, 'a, S: SnapshotStore> ShoppingSession<'c, 'a, S> {
    /// Start an empty session without reading the store.
    pub fn new(catalog: &'c Catalog<'a>, store: S, persistence: &PersistenceConfig) -> Self {
        Self {
            catalog,
            cart: CartLedger::new(),
            wishlist: Wishlist::new(),
            store,
            max_attempts: persistence.max_attempts.max(1),
            last_persistence_error: None,
        }
    }

    /// Start a session from the snapshots held in `store`.
    ///
    /// A missing snapshot starts empty. An unreadable one also starts empty and is
    /// reported through [`Self::last_persistence_error`].
    #[tracing::instrument(name = "session.restore", skip_all)]
    pub fn restore(catalog: &'c Catalog<'a>, store: S, persistence: &PersistenceConfig) -> Self {
        let mut session = Self::new(catalog, store, persistence);

        match session.load_snapshot::<CartSnapshot>(CART_KEY) {
            Ok(snapshot) => session.cart = snapshot.into_ledger(),
            Err(err) => session.record_failure(SnapshotOperation::Load, CART_KEY, 1, err),
        }

        match session.load_snapshot::<WishlistSnapshot>(WISHLIST_KEY) {
            Ok(snapshot) => session.wishlist = snapshot.into_wishlist(),
            Err(err) => session.record_failure(SnapshotOperation::Load, WISHLIST_KEY, 1, err),
        }

        debug!(
            cart_lines = session.cart.len(),
            wishlist_items = session.wishlist.len(),
            "restored session"
        );

        session
    }

    /// Catalog the session prices against.
    pub fn catalog(&self) -> &'c Catalog<'a> {
        self.catalog
    }

    /// Current cart.
    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    /// Current wishlist.
    pub fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    /// Backing snapshot store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// End the session, handing back the snapshot store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Most recent snapshot failure, kept until taken.
    pub fn last_persistence_error(&self) -> Option<&PersistenceFailure> {
        self.last_persistence_error.as_ref()
    }

    /// Take the most recent snapshot failure, clearing it.
    pub fn take_persistence_error(&mut self) -> Option<PersistenceFailure> {
        self.last_persistence_error.take()
    }

    /// Add units of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] if the quantity is rejected; the cart is left unchanged.
    #[tracing::instrument(name = "session.add_to_cart", skip(self), err)]
    pub fn add_to_cart(
        &mut self,
        product_id: &str,
        quantity: i64,
        variant: Option<&str>,
    ) -> Result<LineChange, LedgerError> {
        let change = self.cart.add_item(product_id, quantity, variant)?;

        self.persist_cart();

        Ok(change)
    }

    /// Remove a product's line from the cart.
    #[tracing::instrument(name = "session.remove_from_cart", skip(self))]
    pub fn remove_from_cart(&mut self, product_id: &str) -> LineChange {
        let change = self.cart.remove_item(product_id);

        if change.is_change() {
            self.persist_cart();
        }

        change
    }

    /// Set a line's quantity; zero or below removes it.
    #[tracing::instrument(name = "session.update_quantity", skip(self))]
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> LineChange {
        let change = self.cart.update_quantity(product_id, quantity);

        if change.is_change() {
            self.persist_cart();
        }

        change
    }

    /// Empty the cart.
    #[tracing::instrument(name = "session.clear_cart", skip(self))]
    pub fn clear_cart(&mut self) -> LineChange {
        let change = self.cart.clear();

        if change.is_change() {
            self.persist_cart();
        }

        change
    }

    /// Add a product to the wishlist. Returns `false` if it was already there.
    #[tracing::instrument(name = "session.add_to_wishlist", skip(self))]
    pub fn add_to_wishlist(&mut self, product_id: &str) -> bool {
        let added = self.wishlist.add_item(product_id);

        if added {
            self.persist_wishlist();
        }

        added
    }

    /// Remove a product from the wishlist. Returns `false` if it was not there.
    #[tracing::instrument(name = "session.remove_from_wishlist", skip(self))]
    pub fn remove_from_wishlist(&mut self, product_id: &str) -> bool {
        let removed = self.wishlist.remove_item(product_id);

        if removed {
            self.persist_wishlist();
        }

        removed
    }

    /// Flip a product's wishlist membership, returning the new membership.
    #[tracing::instrument(name = "session.toggle_wishlist", skip(self))]
    pub fn toggle_wishlist(&mut self, product_id: &str) -> bool {
        let member = self.wishlist.toggle_item(product_id);

        self.persist_wishlist();

        member
    }

    /// Check if a product is wishlisted.
    pub fn is_in_wishlist(&self, product_id: &str) -> bool {
        self.wishlist.contains(product_id)
    }

    /// Empty the wishlist.
    #[tracing::instrument(name = "session.clear_wishlist", skip(self))]
    pub fn clear_wishlist(&mut self) -> bool {
        let cleared = self.wishlist.clear();

        if cleared {
            self.persist_wishlist();
        }

        cleared
    }

    /// Delete both stored snapshots, leaving in-memory state untouched.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`] raised by the store.
    pub fn discard_snapshots(&mut self) -> Result<(), StoreError> {
        self.store.remove(CART_KEY)?;
        self.store.remove(WISHLIST_KEY)?;

        debug!("discarded stored snapshots");

        Ok(())
    }

    /// Cart subtotal over the lines the catalog can resolve.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the total overflows.
    pub fn cart_total(&self) -> Result<Money<'a, Currency>, PricingError> {
        self.cart.cart_total(self.catalog)
    }

    /// Total units in the cart.
    pub fn cart_items_count(&self) -> u64 {
        self.cart.items_count()
    }

    /// Cart lines joined with their products.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows.
    pub fn cart_lines(&self) -> Result<Vec<ResolvedLine<'_, 'a>>, PricingError> {
        self.cart.resolved_lines(self.catalog)
    }

    /// Wishlisted products that are still listed.
    pub fn wishlist_products(&self) -> Vec<&'c Product<'a>> {
        self.wishlist.resolved_products(self.catalog)
    }

    /// Price the cart for checkout.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a total overflows or the tier uses another currency.
    pub fn summary(
        &self,
        tier: &DeliveryTier<'a>,
        tax_rate: &Percentage,
    ) -> Result<CheckoutSummary<'a>, PricingError> {
        summarize(&self.cart, self.catalog, tier, tax_rate)
    }

    fn load_snapshot<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        let Some(json) = self.store.load(key)? else {
            trace!(key, "no stored snapshot");
            return Ok(T::default());
        };

        let persisted: Persisted<T> = serde_json::from_str(&json)?;

        Ok(persisted.state)
    }

    fn persist_cart(&mut self) {
        let snapshot = Persisted::new(CartSnapshot::from(&self.cart));

        self.write_snapshot(CART_KEY, &snapshot);
    }

    fn persist_wishlist(&mut self) {
        let snapshot = Persisted::new(WishlistSnapshot::from(&self.wishlist));

        self.write_snapshot(WISHLIST_KEY, &snapshot);
    }

    fn write_snapshot<T: Serialize>(&mut self, key: &'static str, snapshot: &Persisted<T>) {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(err) => {
                self.record_failure(SnapshotOperation::Save, key, 0, err.into());
                return;
            }
        };

        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.store.save(key, &json) {
                Ok(()) => {
                    trace!(key, attempt, "persisted snapshot");
                    return;
                }
                Err(err) if attempt < self.max_attempts => {
                    debug!(key, attempt, %err, "retrying snapshot write");
                }
                Err(err) => {
                    self.record_failure(SnapshotOperation::Save, key, attempt, err);
                    return;
                }
            }
        }
    }

    fn record_failure(
        &mut self,
        operation: SnapshotOperation,
        key: &'static str,
        attempts: u32,
        source: StoreError,
    ) {
        warn!(%operation, key, attempts, error = %source, "snapshot transfer failed");

        self.last_persistence_error = Some(PersistenceFailure {
            operation,
            key,
            attempts,
            source,
        });
    }
}
