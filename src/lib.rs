//! Luma
//!
//! Luma is the cart, wishlist and checkout core of the LUMA beauty storefront: a read-only
//! product catalog, a persisted shopping session, and exact minor-unit pricing for checkout.

pub mod cart;
pub mod catalog;
pub mod categories;
pub mod checkout;
pub mod config;
pub mod persistence;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod session;
pub mod tags;
pub mod utils;
pub mod wishlist;
