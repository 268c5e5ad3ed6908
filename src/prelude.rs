//! Luma prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        CartLedger, CartLineItem, LedgerError, LineChange, ResolvedLine, quantity::QuantityStepper,
    },
    catalog::{Banner, Catalog, CatalogError},
    categories::{Category, CategoryIcon},
    checkout::{
        Checkout, CheckoutError, CheckoutState, GatewayError, OrderConfirmation, OrderGateway,
        OrderLine, OrderRequest, PaymentMethod, PlacedOrder, SimulatedGateway,
    },
    config::{ConfigError, PersistenceConfig, StoreConfig},
    persistence::{FileStore, MemoryStore, SnapshotStore, StoreError},
    pricing::{CheckoutSummary, DeliveryTier, PricingError},
    products::{Product, ProductFlag, ProductId, ProductKey, Variant},
    receipt::{Receipt, ReceiptError},
    session::{PersistenceFailure, ShoppingSession, SnapshotOperation},
    tags::StringTagCollection,
    wishlist::Wishlist,
};
