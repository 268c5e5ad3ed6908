//! Products

use std::{borrow::Borrow, fmt};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::{categories::Category, tags::StringTagCollection};

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Public product identifier, as referenced by cart lines, wishlists and snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Storefront shelves a product can be promoted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductFlag {
    /// New arrivals
    New,

    /// Featured products
    Featured,

    /// Trending now
    Trending,
}

/// A selectable variant of a product, e.g. a lipstick shade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Variant identifier, unique within its product
    pub id: String,

    /// Display name, carried onto cart lines
    pub name: String,

    /// Color token (e.g. `#C8A2C8`)
    pub color: String,
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Brand name
    pub brand: String,

    /// Unit price
    pub price: Money<'a, Currency>,

    /// Price before markdown, if the product is on sale
    pub original_price: Option<Money<'a, Currency>>,

    /// Image references
    pub images: SmallVec<[String; 4]>,

    /// Free-text description
    pub description: String,

    /// Category
    pub category: Category,

    /// Search tags
    pub tags: StringTagCollection,

    /// Average rating out of five
    pub rating: f64,

    /// Number of reviews
    pub review_count: u32,

    /// Shown under "New Arrivals"
    pub is_new: bool,

    /// Shown under "Featured Products"
    pub is_featured: bool,

    /// Shown under "Trending Now"
    pub is_trending: bool,

    /// Ingredient list
    pub ingredients: Option<String>,

    /// Usage instructions
    pub usage: Option<String>,

    /// Selectable variants (empty when the product has none)
    pub variants: SmallVec<[Variant; 6]>,

    /// Units in stock
    pub stock: u32,
}

impl<'a> Product<'a> {
    /// Whether the product is on the given shelf.
    pub fn has_flag(&self, flag: ProductFlag) -> bool {
        match flag {
            ProductFlag::New => self.is_new,
            ProductFlag::Featured => self.is_featured,
            ProductFlag::Trending => self.is_trending,
        }
    }

    /// Find a variant by its identifier.
    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.id == id)
    }

    /// The variant pre-selected on the product page.
    pub fn default_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// Whether any units are left.
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Amount saved against the original price.
    ///
    /// Returns `None` when the product is not marked down.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the two prices have different currencies.
    pub fn savings(&self) -> Result<Option<Money<'a, Currency>>, MoneyError> {
        match self.original_price {
            Some(original) if original.to_minor_units() > self.price.to_minor_units() => {
                Ok(Some(original.sub(self.price)?))
            }
            _ => Ok(None),
        }
    }

    /// Whole-number percentage saved against the original price, rounded half away from zero.
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?.to_minor_units();
        let price = self.price.to_minor_units();

        if original <= price || original <= 0 {
            return None;
        }

        let saved = Decimal::from(original - price);
        let percent = saved.checked_mul(Decimal::ONE_HUNDRED)?.checked_div(Decimal::from(original))?;

        percent
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
    }

    /// Whether `needle` (already lowercased) matches this product's name, brand, category or tags.
    pub(crate) fn matches_query(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.brand.to_lowercase().contains(needle)
            || self.category.tag().contains(needle)
            || self.tags.any_contains(needle)
    }
}
