//! Snapshot formats
//!
//! Snapshots are wrapped as `{"state": ..., "version": 0}` so the stored documents stay
//! readable by the mobile app's own storage layer.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{cart::CartLedger, products::ProductId, wishlist::Wishlist};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 0;

/// Versioned snapshot envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persisted<T> {
    /// Snapshot payload
    pub state: T,

    /// Format version
    #[serde(default)]
    pub version: u32,
}

impl<T> Persisted<T> {
    /// Wrap a payload at the current version.
    pub fn new(state: T) -> Self {
        Self {
            state,
            version: SNAPSHOT_VERSION,
        }
    }
}

/// One stored cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineSnapshot {
    /// Product reference
    pub product_id: ProductId,

    /// Quantity as stored; restoring drops lines below one
    pub quantity: i64,

    /// Variant name chosen when the line was added
    #[serde(default, rename = "shade", skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

/// Stored cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Lines in display order
    #[serde(default)]
    pub items: Vec<CartLineSnapshot>,
}

impl From<&CartLedger> for CartSnapshot {
    fn from(ledger: &CartLedger) -> Self {
        let items = ledger
            .iter()
            .map(|line| CartLineSnapshot {
                product_id: line.product_id().clone(),
                quantity: i64::from(line.quantity()),
                variant: line.variant().map(ToString::to_string),
            })
            .collect();

        Self { items }
    }
}

impl CartSnapshot {
    /// Rebuild a ledger by replaying each stored line as an add.
    ///
    /// Lines that would be rejected (non-positive or overflowing quantities) are dropped
    /// with a warning. Duplicate product lines merge as repeated adds would.
    #[must_use]
    pub fn into_ledger(self) -> CartLedger {
        let mut ledger = CartLedger::new();

        for line in self.items {
            if let Err(err) =
                ledger.add_item(line.product_id.as_str(), line.quantity, line.variant.as_deref())
            {
                warn!(product_id = %line.product_id, %err, "dropping invalid stored cart line");
            }
        }

        ledger
    }
}

/// Stored wishlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistSnapshot {
    /// Product identifiers in insertion order
    #[serde(default)]
    pub items: Vec<ProductId>,
}

impl From<&Wishlist> for WishlistSnapshot {
    fn from(wishlist: &Wishlist) -> Self {
        Self {
            items: wishlist.iter().cloned().collect(),
        }
    }
}

impl WishlistSnapshot {
    /// Rebuild a wishlist, dropping duplicate identifiers.
    #[must_use]
    pub fn into_wishlist(self) -> Wishlist {
        self.items.into_iter().collect()
    }
}
