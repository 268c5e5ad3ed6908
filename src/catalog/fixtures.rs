//! Catalog Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    catalog::{Banner, CatalogError},
    categories::Category,
    products::{Product, ProductId, Variant},
    tags::StringTagCollection,
};

/// Top-level catalog document in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// ISO currency code every price must use
    pub currency: String,

    /// Products, in shelf order
    pub products: Vec<ProductFixture>,

    /// Home screen banners
    #[serde(default)]
    pub banners: Vec<BannerFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Brand name
    pub brand: String,

    /// Product price (e.g., "48.00 USD")
    pub price: String,

    /// Price before markdown (e.g., "45.00 USD")
    #[serde(default)]
    pub original_price: Option<String>,

    /// Image references
    #[serde(default)]
    pub images: Vec<String>,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Category tag
    pub category: String,

    /// Search tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Average rating
    #[serde(default)]
    pub rating: f64,

    /// Number of reviews
    #[serde(default)]
    pub review_count: u32,

    /// New arrival flag
    #[serde(default)]
    pub is_new: bool,

    /// Featured flag
    #[serde(default)]
    pub is_featured: bool,

    /// Trending flag
    #[serde(default)]
    pub is_trending: bool,

    /// Ingredient list
    #[serde(default)]
    pub ingredients: Option<String>,

    /// Usage instructions
    #[serde(default)]
    pub usage: Option<String>,

    /// Variants (shades)
    #[serde(default)]
    pub variants: Vec<VariantFixture>,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,
}

/// Variant Fixture
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    /// Variant identifier
    pub id: String,

    /// Variant name
    pub name: String,

    /// Color token
    pub color: String,
}

/// Banner Fixture
#[derive(Debug, Deserialize)]
pub struct BannerFixture {
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

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = CatalogError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;
        let price = Money::from_minor(minor_units, currency);

        let original_price = fixture
            .original_price
            .as_deref()
            .map(parse_price)
            .transpose()?
            .map(|(minor, currency)| Money::from_minor(minor, currency));

        let category: Category = fixture.category.parse()?;

        let tag_refs: Vec<&str> = fixture.tags.iter().map(String::as_str).collect();
        let tags = StringTagCollection::from_strs(&tag_refs);

        let variants = fixture
            .variants
            .into_iter()
            .map(|variant| Variant {
                id: variant.id,
                name: variant.name,
                color: variant.color,
            })
            .collect();

        Ok(Product {
            id: ProductId::new(fixture.id),
            name: fixture.name,
            brand: fixture.brand,
            price,
            original_price,
            images: SmallVec::from_vec(fixture.images),
            description: fixture.description,
            category,
            tags,
            rating: fixture.rating,
            review_count: fixture.review_count,
            is_new: fixture.is_new,
            is_featured: fixture.is_featured,
            is_trending: fixture.is_trending,
            ingredients: fixture.ingredients,
            usage: fixture.usage,
            variants,
            stock: fixture.stock,
        })
    }
}

impl From<BannerFixture> for Banner {
    fn from(fixture: BannerFixture) -> Self {
        Banner {
            id: fixture.id,
            title: fixture.title,
            subtitle: fixture.subtitle,
            image: fixture.image,
            action_text: fixture.action_text,
            link: fixture.link,
        }
    }
}

/// Look up a supported ISO currency by its alpha code.
///
/// # Errors
///
/// Returns [`CatalogError::UnknownCurrency`] for codes other than GBP, USD and EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, CatalogError> {
    match code.trim() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(CatalogError::UnknownCurrency(other.to_string())),
    }
}

/// Parse price string (e.g., "48.00 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal or is finer than a minor unit,
/// or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), CatalogError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(CatalogError::InvalidPrice(s.to_string()));
    }

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .filter(|value| value.fract().is_zero())
        .and_then(|value| value.to_i64())
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(currency_code)?;

    Ok((minor_units, currency))
}

/// Parse percentage string (e.g., "8%" or "0.08") into a `Percentage`
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, CatalogError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| CatalogError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| CatalogError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}
