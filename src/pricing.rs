//! Pricing
//!
//! Cart totals and the checkout summary. Everything is computed in integer minor units;
//! the only rounding happens once, when the tax rate is applied to the subtotal.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::trace;

use crate::{cart::CartLedger, catalog::Catalog};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line or cart total does not fit in minor units.
    #[error("price overflowed minor units")]
    Overflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A delivery option offered at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryTier<'a> {
    /// Tier identifier (e.g. `standard`)
    pub id: String,

    /// Display name
    pub name: String,

    /// Flat shipping fee
    pub price: Money<'a, Currency>,

    /// Business-day estimate (e.g. `3-5`)
    pub days: String,
}

/// Derived checkout totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutSummary<'a> {
    subtotal: Money<'a, Currency>,
    shipping: Money<'a, Currency>,
    tax: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a> CheckoutSummary<'a> {
    /// Price a subtotal with a shipping fee and tax rate.
    ///
    /// Shipping is waived when the subtotal is zero.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the tax cannot be computed or the currencies differ.
    pub fn from_subtotal(
        subtotal: Money<'a, Currency>,
        shipping_fee: Money<'a, Currency>,
        tax_rate: &Percentage,
    ) -> Result<Self, PricingError> {
        let currency = subtotal.currency();

        let shipping = if subtotal.to_minor_units() > 0 {
            shipping_fee
        } else {
            Money::from_minor(0, currency)
        };

        let tax = Money::from_minor(
            percent_of_minor(tax_rate, subtotal.to_minor_units())?,
            currency,
        );

        let total = subtotal.add(shipping)?.add(tax)?;

        Ok(Self {
            subtotal,
            shipping,
            tax,
            total,
        })
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Shipping fee for the selected delivery tier.
    #[must_use]
    pub fn shipping(&self) -> Money<'a, Currency> {
        self.shipping
    }

    /// Tax on the subtotal.
    #[must_use]
    pub fn tax(&self) -> Money<'a, Currency> {
        self.tax
    }

    /// Grand total.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }
}

/// Price a cart for checkout.
///
/// # Errors
///
/// Returns a [`PricingError`] if any total overflows or the tier is priced in another currency.
pub fn summarize<'a>(
    ledger: &CartLedger,
    catalog: &Catalog<'a>,
    tier: &DeliveryTier<'a>,
    tax_rate: &Percentage,
) -> Result<CheckoutSummary<'a>, PricingError> {
    CheckoutSummary::from_subtotal(cart_total(ledger, catalog)?, tier.price, tax_rate)
}

/// Unit price multiplied by a quantity.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the result does not fit in minor units.
pub fn line_total(
    price: Money<'_, Currency>,
    quantity: u32,
) -> Result<Money<'_, Currency>, PricingError> {
    let minor = price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, price.currency()))
}

/// Sum of price times quantity over every line the catalog can resolve.
///
/// Lines referring to products that are no longer listed contribute nothing.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
pub fn cart_total<'a>(
    ledger: &CartLedger,
    catalog: &Catalog<'a>,
) -> Result<Money<'a, Currency>, PricingError> {
    let currency = catalog.currency();

    let minor = ledger.iter().try_fold(0_i64, |acc, line| {
        let Some(price) = catalog.price_of(line.product_id().as_str()) else {
            trace!(product_id = %line.product_id(), "skipping unlisted product in cart total");
            return Ok(acc);
        };

        let line_minor = line_total(price, line.quantity())?.to_minor_units();

        acc.checked_add(line_minor).ok_or(PricingError::Overflow)
    })?;

    Ok(Money::from_minor(minor, currency))
}

/// Calculate a percentage of a minor unit amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn standard<'a>() -> DeliveryTier<'a> {
        DeliveryTier {
            id: "standard".to_string(),
            name: "Standard Delivery".to_string(),
            price: Money::from_minor(599, USD),
            days: "3-5".to_string(),
        }
    }

    #[test]
    fn summary_applies_tax_and_shipping() -> TestResult {
        let summary = CheckoutSummary::from_subtotal(
            Money::from_minor(4800, USD),
            Money::from_minor(599, USD),
            &Percentage::from(0.08),
        )?;

        assert_eq!(summary.subtotal(), Money::from_minor(4800, USD));
        assert_eq!(summary.shipping(), Money::from_minor(599, USD));
        assert_eq!(summary.tax(), Money::from_minor(384, USD));
        assert_eq!(summary.total(), Money::from_minor(5783, USD));

        Ok(())
    }

    #[test]
    fn summary_waives_shipping_for_empty_cart() -> TestResult {
        let summary = CheckoutSummary::from_subtotal(
            Money::from_minor(0, USD),
            Money::from_minor(999, USD),
            &Percentage::from(0.08),
        )?;

        assert_eq!(summary.shipping(), Money::from_minor(0, USD));
        assert_eq!(summary.tax(), Money::from_minor(0, USD));
        assert_eq!(summary.total(), Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn summary_rounds_tax_half_away_from_zero() -> TestResult {
        let summary = CheckoutSummary::from_subtotal(
            Money::from_minor(1875, USD),
            Money::from_minor(0, USD),
            &Percentage::from(0.08),
        )?;

        // 1875 * 0.08 = 150.00
        assert_eq!(summary.tax(), Money::from_minor(150, USD));

        let summary = CheckoutSummary::from_subtotal(
            Money::from_minor(2450, USD),
            Money::from_minor(0, USD),
            &Percentage::from(0.05),
        )?;

        // 2450 * 0.05 = 122.5 -> 123
        assert_eq!(summary.tax(), Money::from_minor(123, USD));

        Ok(())
    }

    #[test]
    fn summary_rejects_mismatched_tier_currency() {
        let result = CheckoutSummary::from_subtotal(
            Money::from_minor(100, USD),
            Money::from_minor(100, GBP),
            &Percentage::from(0.08),
        );

        assert!(matches!(result, Err(PricingError::Money(_))));
    }

    #[test]
    fn line_total_multiplies_and_detects_overflow() -> TestResult {
        assert_eq!(
            line_total(Money::from_minor(2400, USD), 3)?,
            Money::from_minor(7200, USD)
        );
        assert_eq!(
            line_total(Money::from_minor(i64::MAX, USD), 2),
            Err(PricingError::Overflow)
        );

        Ok(())
    }

    #[test]
    fn cart_total_ignores_unknown_products() -> TestResult {
        let catalog = Catalog::builtin()?;
        let mut ledger = CartLedger::new();

        ledger.add_item("1", 1, None)?;
        ledger.add_item("missing", 3, None)?;

        assert_eq!(cart_total(&ledger, &catalog)?, Money::from_minor(4800, USD));

        Ok(())
    }

    #[test]
    fn summarize_prices_cart_against_catalog() -> TestResult {
        let catalog = Catalog::builtin()?;
        let mut ledger = CartLedger::new();

        ledger.add_item("2", 2, Some("Ruby Red"))?;

        let summary = summarize(&ledger, &catalog, &standard(), &Percentage::from(0.08))?;

        assert_eq!(summary.total(), Money::from_minor(5783, USD));

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let result = percent_of_minor(&Percentage::from(2.0), i64::MAX);

        assert_eq!(result, Err(PricingError::PercentConversion));
    }
}
