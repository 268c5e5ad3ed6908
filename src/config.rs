//! Store configuration
//!
//! Checkout pricing rules, persistence policy and simulated gateway latency. The defaults
//! match the storefront as shipped; a YAML document can override any section.

use std::{fs, path::Path, path::PathBuf, time::Duration};

use decimal_percentage::Percentage;
use rusty_money::{
    Money,
    iso::{Currency, USD},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::{
        CatalogError,
        fixtures::{parse_currency, parse_percentage, parse_price},
    },
    checkout::PaymentMethod,
    pricing::DeliveryTier,
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price, percentage or currency
    #[error(transparent)]
    Value(#[from] CatalogError),

    /// At least one delivery tier is required
    #[error("No delivery tiers configured")]
    NoDeliveryTiers,

    /// At least one payment method is required
    #[error("No payment methods configured")]
    NoPaymentMethods,

    /// A delivery tier is priced in a different currency than the store
    #[error("Delivery tier {0} is priced in {1}, but the store uses {2}")]
    CurrencyMismatch(String, &'static str, &'static str),
}

/// Snapshot persistence policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// Attempts per snapshot write before the failure is surfaced
    pub max_attempts: u32,

    /// Directory for file-backed snapshots; in-memory when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            data_dir: None,
        }
    }
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Currency for every price
    pub currency: &'static Currency,

    /// Flat tax rate applied to the subtotal
    pub tax_rate: Percentage,

    /// Delivery options, the first being the default selection
    pub delivery_tiers: Vec<DeliveryTier<'static>>,

    /// Payment options, the first being the default selection
    pub payment_methods: Vec<PaymentMethod>,

    /// Snapshot persistence policy
    pub persistence: PersistenceConfig,

    /// Delay before the simulated gateway confirms an order
    pub order_latency: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: USD,
            tax_rate: Percentage::from(0.08),
            delivery_tiers: vec![
                DeliveryTier {
                    id: "standard".to_string(),
                    name: "Standard Delivery".to_string(),
                    price: Money::from_minor(599, USD),
                    days: "3-5".to_string(),
                },
                DeliveryTier {
                    id: "express".to_string(),
                    name: "Express Delivery".to_string(),
                    price: Money::from_minor(999, USD),
                    days: "1-2".to_string(),
                },
            ],
            payment_methods: vec![PaymentMethod::Card, PaymentMethod::CashOnDelivery],
            persistence: PersistenceConfig::default(),
            order_latency: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    currency: Option<String>,
    tax_rate: Option<String>,
    delivery_tiers: Option<Vec<DeliveryTierFile>>,
    payment_methods: Option<Vec<PaymentMethod>>,
    persistence: Option<PersistenceFile>,
    order_latency_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeliveryTierFile {
    id: String,
    name: String,
    price: String,
    days: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PersistenceFile {
    max_attempts: Option<u32>,
    data_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Load configuration from a YAML file, falling back to defaults for missing sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid values.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;

        Self::from_yaml_str(&contents)
    }

    /// Load configuration from a YAML document, falling back to defaults for missing sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed, a value is invalid, a delivery tier
    /// uses another currency, or a list section is present but empty.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: Option<ConfigFile> = serde_norway::from_str(yaml)?;
        let file = file.unwrap_or_default();
        let mut config = Self::default();

        if let Some(code) = file.currency.as_deref() {
            config.currency = parse_currency(code)?;
        }

        if let Some(rate) = file.tax_rate.as_deref() {
            config.tax_rate = parse_percentage(rate)?;
        }

        if let Some(tiers) = file.delivery_tiers {
            config.delivery_tiers = tiers
                .into_iter()
                .map(|tier| config.delivery_tier_from_file(tier))
                .collect::<Result<_, _>>()?;
        } else if config.currency != USD {
            // Default tier prices are in USD; re-denominate them for the configured currency.
            for tier in &mut config.delivery_tiers {
                tier.price = Money::from_minor(tier.price.to_minor_units(), config.currency);
            }
        }

        if config.delivery_tiers.is_empty() {
            return Err(ConfigError::NoDeliveryTiers);
        }

        if let Some(methods) = file.payment_methods {
            if methods.is_empty() {
                return Err(ConfigError::NoPaymentMethods);
            }

            config.payment_methods = methods;
        }

        if let Some(persistence) = file.persistence {
            if let Some(max_attempts) = persistence.max_attempts {
                config.persistence.max_attempts = max_attempts.max(1);
            }

            config.persistence.data_dir = persistence.data_dir;
        }

        if let Some(latency) = file.order_latency_ms {
            config.order_latency = Duration::from_millis(latency);
        }

        Ok(config)
    }

    /// Find a delivery tier by identifier.
    pub fn delivery_tier(&self, id: &str) -> Option<&DeliveryTier<'static>> {
        self.delivery_tiers.iter().find(|tier| tier.id == id)
    }

    /// The delivery tier selected when checkout opens.
    pub fn default_delivery_tier(&self) -> Option<&DeliveryTier<'static>> {
        self.delivery_tiers.first()
    }

    /// The payment method selected when checkout opens.
    pub fn default_payment_method(&self) -> Option<PaymentMethod> {
        self.payment_methods.first().copied()
    }

    fn delivery_tier_from_file(
        &self,
        tier: DeliveryTierFile,
    ) -> Result<DeliveryTier<'static>, ConfigError> {
        let (minor, currency) = parse_price(&tier.price)?;

        if currency != self.currency {
            return Err(ConfigError::CurrencyMismatch(
                tier.id,
                currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        Ok(DeliveryTier {
            id: tier.id,
            name: tier.name,
            price: Money::from_minor(minor, currency),
            days: tier.days,
        })
    }
}
