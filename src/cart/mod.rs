//! Cart Ledger
//!
//! Ordered line items, at most one per product. Quantities are always at least one: a line
//! whose quantity would drop to zero or below is removed instead.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::Catalog,
    pricing::{PricingError, cart_total, line_total},
    products::{Product, ProductId},
};

pub mod quantity;

/// Errors raised when a cart mutation is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Quantities added to the cart must be positive.
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// The resulting quantity does not fit in a line item.
    #[error("Quantity for product {0} overflowed")]
    QuantityOverflow(ProductId),
}

/// Outcome of a cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// A new line was appended.
    Added,

    /// An existing line's quantity changed.
    Updated,

    /// A line was removed.
    Removed,

    /// Nothing changed.
    Unchanged,
}

impl LineChange {
    /// Whether the mutation altered the ledger.
    #[must_use]
    pub fn is_change(self) -> bool {
        self != LineChange::Unchanged
    }
}

/// One row in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineItem {
    product_id: ProductId,
    quantity: u32,
    variant: Option<String>,
}

impl CartLineItem {
    /// Product this line refers to.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Quantity, always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Variant name chosen when the line was first added.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }
}

/// A cart line joined with its catalog product.
#[derive(Debug, Clone)]
pub struct ResolvedLine<'c, 'a> {
    /// The cart line
    pub line: &'c CartLineItem,

    /// The product it refers to
    pub product: &'c Product<'a>,

    /// Unit price multiplied by quantity
    pub line_total: Money<'a, Currency>,
}

/// Cart Ledger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartLedger {
    items: Vec<CartLineItem>,
}

impl CartLedger {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of a product.
    ///
    /// If the product already has a line its quantity is incremented and its variant is left
    /// as it was; otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidQuantity`] if `quantity` is zero or negative.
    /// - [`LedgerError::QuantityOverflow`] if the new quantity does not fit.
    pub fn add_item(
        &mut self,
        product_id: &str,
        quantity: i64,
        variant: Option<&str>,
    ) -> Result<LineChange, LedgerError> {
        if quantity <= 0 {
            return Err(LedgerError::InvalidQuantity(quantity));
        }

        let quantity =
            u32::try_from(quantity).map_err(|_err| LedgerError::QuantityOverflow(product_id.into()))?;

        if let Some(line) = self.line_mut(product_id) {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| LedgerError::QuantityOverflow(line.product_id.clone()))?;

            if variant.is_some() && line.variant.as_deref() != variant {
                debug!(
                    product_id,
                    kept = line.variant.as_deref(),
                    ignored = variant,
                    "keeping variant from first add"
                );
            }

            return Ok(LineChange::Updated);
        }

        self.items.push(CartLineItem {
            product_id: product_id.into(),
            quantity,
            variant: variant.map(ToString::to_string),
        });

        Ok(LineChange::Added)
    }

    /// Remove a product's line. Removing an absent product is a no-op.
    pub fn remove_item(&mut self, product_id: &str) -> LineChange {
        let before = self.items.len();

        self.items.retain(|line| line.product_id.as_str() != product_id);

        if self.items.len() == before {
            LineChange::Unchanged
        } else {
            LineChange::Removed
        }
    }

    /// Set a line's quantity. Zero or negative removes the line.
    ///
    /// Products without a line are left alone.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> LineChange {
        if quantity <= 0 {
            return self.remove_item(product_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        match self.line_mut(product_id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                LineChange::Updated
            }
            _ => LineChange::Unchanged,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) -> LineChange {
        if self.items.is_empty() {
            return LineChange::Unchanged;
        }

        self.items.clear();

        LineChange::Removed
    }

    /// Get the line for a product.
    pub fn get(&self, product_id: &str) -> Option<&CartLineItem> {
        self.items
            .iter()
            .find(|line| line.product_id.as_str() == product_id)
    }

    /// Iterate over lines in display order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLineItem> {
        self.items.iter()
    }

    /// Lines in display order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Sum of quantities across all lines.
    pub fn items_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of price times quantity over lines the catalog can still resolve.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the total overflows.
    pub fn cart_total<'a>(
        &self,
        catalog: &Catalog<'a>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        cart_total(self, catalog)
    }

    /// Join lines with their products, omitting lines whose product is no longer listed.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows.
    pub fn resolved_lines<'c, 'a>(
        &'c self,
        catalog: &'c Catalog<'a>,
    ) -> Result<Vec<ResolvedLine<'c, 'a>>, PricingError> {
        self.items
            .iter()
            .filter_map(|line| {
                catalog
                    .find_by_id(line.product_id.as_str())
                    .map(|product| (line, product))
            })
            .map(|(line, product)| -> Result<ResolvedLine<'c, 'a>, PricingError> {
                Ok(ResolvedLine {
                    line,
                    product,
                    line_total: line_total(product.price, line.quantity)?,
                })
            })
            .collect()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|line| line.product_id.as_str() == product_id)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    fn quantities(ledger: &CartLedger) -> Vec<(&str, u32)> {
        ledger
            .iter()
            .map(|line| (line.product_id().as_str(), line.quantity()))
            .collect()
    }

    #[test]
    fn add_item_appends_then_increments() -> TestResult {
        let mut ledger = CartLedger::new();

        assert_eq!(ledger.add_item("1", 2, None)?, LineChange::Added);
        assert_eq!(ledger.add_item("2", 1, None)?, LineChange::Added);
        assert_eq!(ledger.add_item("1", 1, None)?, LineChange::Updated);

        assert_eq!(quantities(&ledger), vec![("1", 3), ("2", 1)]);
        assert_eq!(ledger.items_count(), 4);

        Ok(())
    }

    #[test]
    fn add_item_rejects_non_positive_quantities() -> TestResult {
        let mut ledger = CartLedger::new();
        ledger.add_item("1", 1, None)?;

        assert_eq!(
            ledger.add_item("1", 0, None),
            Err(LedgerError::InvalidQuantity(0))
        );
        assert_eq!(
            ledger.add_item("2", -3, None),
            Err(LedgerError::InvalidQuantity(-3))
        );
        assert_eq!(quantities(&ledger), vec![("1", 1)]);

        Ok(())
    }

    #[test]
    fn add_item_rejects_overflow_and_keeps_quantity() -> TestResult {
        let mut ledger = CartLedger::new();
        ledger.add_item("1", i64::from(u32::MAX), None)?;

        let result = ledger.add_item("1", 1, None);

        assert_eq!(
            result,
            Err(LedgerError::QuantityOverflow(ProductId::from("1")))
        );
        assert_eq!(ledger.get("1").map(CartLineItem::quantity), Some(u32::MAX));

        Ok(())
    }

    #[test]
    fn add_item_keeps_first_variant() -> TestResult {
        let mut ledger = CartLedger::new();

        ledger.add_item("2", 1, Some("Mauve Dream"))?;
        ledger.add_item("2", 1, Some("Ruby Red"))?;

        let line = ledger.get("2");

        assert_eq!(line.and_then(CartLineItem::variant), Some("Mauve Dream"));
        assert_eq!(line.map(CartLineItem::quantity), Some(2));
        assert_eq!(ledger.len(), 1);

        Ok(())
    }

    #[test]
    fn remove_item_absent_is_noop() -> TestResult {
        let mut ledger = CartLedger::new();
        ledger.add_item("1", 1, None)?;
        ledger.add_item("2", 2, None)?;

        let before = ledger.clone();

        assert_eq!(ledger.remove_item("9"), LineChange::Unchanged);
        assert_eq!(ledger, before);

        assert_eq!(ledger.remove_item("1"), LineChange::Removed);
        assert_eq!(quantities(&ledger), vec![("2", 2)]);

        Ok(())
    }

    #[test]
    fn update_quantity_sets_absolute_value() -> TestResult {
        let mut ledger = CartLedger::new();
        ledger.add_item("1", 5, None)?;

        assert_eq!(ledger.update_quantity("1", 2), LineChange::Updated);
        assert_eq!(ledger.update_quantity("1", 2), LineChange::Unchanged);
        assert_eq!(quantities(&ledger), vec![("1", 2)]);

        Ok(())
    }

    #[test]
    fn update_quantity_zero_or_negative_removes() -> TestResult {
        let mut ledger = CartLedger::new();
        ledger.add_item("1", 5, None)?;
        ledger.add_item("2", 5, None)?;

        assert_eq!(ledger.update_quantity("1", 0), LineChange::Removed);
        assert_eq!(ledger.update_quantity("2", -4), LineChange::Removed);
        assert!(ledger.is_empty());

        Ok(())
    }

    #[test]
    fn update_quantity_without_line_is_noop() {
        let mut ledger = CartLedger::new();

        assert_eq!(ledger.update_quantity("1", 3), LineChange::Unchanged);
        assert!(ledger.is_empty());
    }

    #[test]
    fn clear_empties_ledger() -> TestResult {
        let mut ledger = CartLedger::new();
        ledger.add_item("1", 1, None)?;

        assert_eq!(ledger.clear(), LineChange::Removed);
        assert_eq!(ledger.clear(), LineChange::Unchanged);
        assert_eq!(ledger.items_count(), 0);

        Ok(())
    }

    #[test]
    fn resolved_lines_skip_unknown_products() -> TestResult {
        let catalog = Catalog::builtin()?;
        let mut ledger = CartLedger::new();

        ledger.add_item("1", 2, None)?;
        ledger.add_item("delisted", 4, None)?;
        ledger.add_item("8", 1, None)?;

        let lines = ledger.resolved_lines(&catalog)?;

        let summary: Vec<(&str, Money<'_, Currency>)> = lines
            .iter()
            .map(|resolved| (resolved.product.id.as_str(), resolved.line_total))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("1", Money::from_minor(9600, USD)),
                ("8", Money::from_minor(1800, USD)),
            ]
        );

        Ok(())
    }
}
