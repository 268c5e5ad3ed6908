//! Snapshot persistence
//!
//! A key-value store for serialized cart and wishlist snapshots. The in-memory session is
//! the source of truth; stored snapshots only exist to survive restarts, and the last write
//! wins.

use mockall::automock;
use thiserror::Error;

pub mod file;
pub mod memory;
pub mod snapshots;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use snapshots::{CartLineSnapshot, CartSnapshot, Persisted, WishlistSnapshot};

/// Storage key for the cart snapshot.
pub const CART_KEY: &str = "cart-storage";

/// Storage key for the wishlist snapshot.
pub const WISHLIST_KEY: &str = "wishlist-storage";

/// Errors raised by a snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error reading or writing a snapshot
    #[error("snapshot IO failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded
    #[error("snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The backing store refused the operation
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store for serialized snapshots.
#[automock]
pub trait SnapshotStore {
    /// Read the snapshot stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the snapshot stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the snapshot cannot be written.
    fn save(&mut self, key: &str, snapshot: &str) -> Result<(), StoreError>;

    /// Delete the snapshot stored under `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be modified.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}
