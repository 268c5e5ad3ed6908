//! Catalog
//!
//! Read-only product collection the cart and wishlist price and resolve against.
//! Products live in a [`SlotMap`] keyed by [`ProductKey`] with an [`FxHashMap`] index from
//! the public [`ProductId`]. Lookups never fail: an unknown identifier is `None`.

use std::{fs, path::Path};

use rusty_money::{Money, iso::Currency};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::fixtures::{CatalogFixture, parse_currency},
    categories::{Category, UnknownCategory},
    products::{Product, ProductFlag, ProductId, ProductKey},
};

pub mod fixtures;

/// Queries this short or shorter return no search results.
pub const MIN_SEARCH_QUERY_LEN: usize = 3;

const BUILTIN_CATALOG: &str = include_str!("../../fixtures/catalog/luma.yml");

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Unknown category tag
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),

    /// Currency mismatch between a product and the catalog
    #[error("Currency mismatch for product {0}: expected {1}, found {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// The same product identifier was listed twice
    #[error("Duplicate product: {0}")]
    DuplicateProduct(ProductId),
}

/// Home screen banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// Banner identifier
    pub id: String,

    /// Headline
    pub title: String,

    /// Supporting text
    pub subtitle: String,

    /// Image reference
    pub image: String,

    /// Call to action label
    pub action_text: String,

    /// In-app route the banner links to
    pub link: String,
}

/// Catalog
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    product_keys: FxHashMap<ProductId, ProductKey>,
    banners: Vec<Banner>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            banners: Vec::new(),
            currency,
        }
    }

    /// The catalog compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded catalog document is invalid.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if any product is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path.as_ref())?;

        Self::from_yaml_str(&contents)
    }

    /// Load a catalog from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed, a price or category is invalid, a
    /// product is priced in another currency, or a product identifier repeats.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;
        let currency = parse_currency(&fixture.currency)?;

        let mut catalog = Self::new(currency);

        for product_fixture in fixture.products {
            catalog.insert(product_fixture.try_into()?)?;
        }

        catalog.banners = fixture.banners.into_iter().map(Banner::from).collect();

        debug!(
            products = catalog.len(),
            banners = catalog.banners.len(),
            currency = currency.iso_alpha_code,
            "loaded catalog"
        );

        Ok(catalog)
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CurrencyMismatch`] if any of the product's prices use a different
    /// currency, or [`CatalogError::DuplicateProduct`] if the identifier is already present.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        let prices = std::iter::once(product.price).chain(product.original_price);

        for price in prices {
            if price.currency() != self.currency {
                return Err(CatalogError::CurrencyMismatch(
                    product.id.clone(),
                    self.currency.iso_alpha_code,
                    price.currency().iso_alpha_code,
                ));
            }
        }

        if self.product_keys.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.product_keys.insert(id, key);

        Ok(key)
    }

    /// Add a banner.
    pub fn push_banner(&mut self, banner: Banner) {
        self.banners.push(banner);
    }

    /// Resolve a product identifier.
    pub fn find_by_id(&self, id: &str) -> Option<&Product<'a>> {
        self.product_keys
            .get(id)
            .and_then(|key| self.products.get(*key))
    }

    /// Unit price of a product, if it is still listed.
    pub fn price_of(&self, id: &str) -> Option<Money<'a, Currency>> {
        self.find_by_id(id).map(|product| product.price)
    }

    /// Get a product by its slot key.
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Products whose category tag matches `category`, ignoring case and surrounding space.
    ///
    /// An unrecognized category yields no products.
    pub fn filter_by_category(&self, category: &str) -> Vec<&Product<'a>> {
        category
            .parse::<Category>()
            .map(|category| self.products_in(category))
            .unwrap_or_default()
    }

    /// Products in a category.
    pub fn products_in(&self, category: Category) -> Vec<&Product<'a>> {
        self.products()
            .filter(|product| product.category == category)
            .collect()
    }

    /// Products on a shelf.
    pub fn filter_by_flag(&self, flag: ProductFlag) -> Vec<&Product<'a>> {
        self.products()
            .filter(|product| product.has_flag(flag))
            .collect()
    }

    /// Case-insensitive substring search over name, brand, category and tags.
    ///
    /// Queries of [`MIN_SEARCH_QUERY_LEN`] - 1 characters or fewer return nothing.
    pub fn search(&self, query: &str) -> Vec<&Product<'a>> {
        let needle = query.trim().to_lowercase();

        if needle.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Vec::new();
        }

        self.products()
            .filter(|product| product.matches_query(&needle))
            .collect()
    }

    /// Other products sharing a category or tag with `id`.
    pub fn related(&self, id: &str) -> Vec<&Product<'a>> {
        let Some(target) = self.find_by_id(id) else {
            return Vec::new();
        };

        self.products()
            .filter(|product| product.id != target.id)
            .filter(|product| {
                product.category == target.category || product.tags.intersects(&target.tags)
            })
            .collect()
    }

    /// Iterate over all products in insertion order.
    pub fn products(&self) -> impl Iterator<Item = &Product<'a>> {
        self.products.values()
    }

    /// Home screen banners.
    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    /// Currency every price in the catalog uses.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::products::tests::product;

    use super::*;

    #[test]
    fn builtin_catalog_loads_all_products_and_banners() -> TestResult {
        let catalog = Catalog::builtin()?;

        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.banners().len(), 3);
        assert_eq!(catalog.currency(), USD);

        Ok(())
    }

    #[test]
    fn find_by_id_returns_product_or_none() -> TestResult {
        let catalog = Catalog::builtin()?;

        let serum = catalog.find_by_id("1");

        assert_eq!(
            serum.map(|p| p.name.as_str()),
            Some("Hydrating Facial Serum")
        );
        assert_eq!(catalog.price_of("1"), Some(Money::from_minor(4800, USD)));
        assert!(catalog.find_by_id("404").is_none());
        assert!(catalog.price_of("404").is_none());

        Ok(())
    }

    #[test]
    fn filter_by_category_is_case_normalized() -> TestResult {
        let catalog = Catalog::builtin()?;

        let ids: Vec<&str> = catalog
            .filter_by_category("SkinCare")
            .iter()
            .map(|p| p.id.as_str())
            .collect();

        assert_eq!(ids, vec!["1", "3", "5"]);
        assert!(catalog.filter_by_category("hair").is_empty());
        assert!(catalog.filter_by_category("snacks").is_empty());

        Ok(())
    }

    #[test]
    fn filter_by_flag_selects_shelves() -> TestResult {
        let catalog = Catalog::builtin()?;

        let ids = |flag| -> Vec<String> {
            catalog
                .filter_by_flag(flag)
                .iter()
                .map(|p| p.id.to_string())
                .collect()
        };

        assert_eq!(ids(ProductFlag::New), vec!["1", "4", "7"]);
        assert_eq!(ids(ProductFlag::Featured), vec!["1", "3"]);
        assert_eq!(ids(ProductFlag::Trending), vec!["2", "4", "6"]);

        Ok(())
    }

    #[test]
    fn search_matches_fields_and_ignores_short_queries() -> TestResult {
        let catalog = Catalog::builtin()?;

        let ids: Vec<&str> = catalog
            .search("Serum")
            .iter()
            .map(|p| p.id.as_str())
            .collect();

        assert_eq!(ids, vec!["1"]);
        assert_eq!(catalog.search("luma body").len(), 1);
        assert_eq!(catalog.search("makeup").len(), 4);
        assert!(catalog.search("se").is_empty());
        assert!(catalog.search("   ").is_empty());

        Ok(())
    }

    #[test]
    fn related_shares_category_or_tags() -> TestResult {
        let catalog = Catalog::builtin()?;

        let ids: Vec<&str> = catalog
            .related("7")
            .iter()
            .map(|p| p.id.as_str())
            .collect();

        // Body oil only shares "hydrating" with the facial serum.
        assert_eq!(ids, vec!["1"]);
        assert!(catalog.related("404").is_empty());

        Ok(())
    }

    #[test]
    fn insert_rejects_currency_mismatch() {
        let mut catalog = Catalog::new(GBP);

        let result = catalog.insert(product("1", 100));

        assert!(matches!(
            result,
            Err(CatalogError::CurrencyMismatch(id, "GBP", "USD")) if id.as_str() == "1"
        ));
    }

    #[test]
    fn insert_rejects_duplicate_ids() -> TestResult {
        let mut catalog = Catalog::new(USD);

        catalog.insert(product("1", 100))?;
        let result = catalog.insert(product("1", 200));

        assert!(matches!(result, Err(CatalogError::DuplicateProduct(_))));
        assert_eq!(catalog.len(), 1);

        Ok(())
    }

    #[test]
    fn from_yaml_str_rejects_unknown_currency() {
        let result = Catalog::from_yaml_str("currency: JPY\nproducts: []\n");

        assert!(matches!(result, Err(CatalogError::UnknownCurrency(code)) if code == "JPY"));
    }
}
