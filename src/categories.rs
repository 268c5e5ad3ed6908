//! Categories

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An unrecognized category tag.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Storefront category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Skincare
    Skincare,

    /// Makeup
    Makeup,

    /// Body care
    Body,

    /// Hair care
    Hair,

    /// Fragrance
    Fragrance,
}

/// Icon shown on a category card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryIcon {
    /// Droplet
    Droplet,

    /// Palette
    Palette,

    /// Bath
    Bath,

    /// Scissors
    Scissors,

    /// Flower
    Flower,
}

impl Category {
    /// Every category, in shelf order.
    pub const ALL: [Category; 5] = [
        Category::Skincare,
        Category::Makeup,
        Category::Body,
        Category::Hair,
        Category::Fragrance,
    ];

    /// Lowercase tag used in catalog data and routes.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Category::Skincare => "skincare",
            Category::Makeup => "makeup",
            Category::Body => "body",
            Category::Hair => "hair",
            Category::Fragrance => "fragrance",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Category::Skincare => "Skincare",
            Category::Makeup => "Makeup",
            Category::Body => "Body",
            Category::Hair => "Hair",
            Category::Fragrance => "Fragrance",
        }
    }

    /// Icon for the category card.
    #[must_use]
    pub const fn icon(self) -> CategoryIcon {
        match self {
            Category::Skincare => CategoryIcon::Droplet,
            Category::Makeup => CategoryIcon::Palette,
            Category::Body => CategoryIcon::Bath,
            Category::Hair => CategoryIcon::Scissors,
            Category::Fragrance => CategoryIcon::Flower,
        }
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();

        Category::ALL
            .into_iter()
            .find(|category| category.tag() == normalized)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
