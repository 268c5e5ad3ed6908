//! Wishlist

use crate::{
    catalog::Catalog,
    products::{Product, ProductId},
};

/// Set of wishlisted product identifiers, kept in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wishlist {
    items: Vec<ProductId>,
}

impl Wishlist {
    /// Create an empty wishlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product. Returns `false` if it was already present.
    pub fn add_item(&mut self, product_id: &str) -> bool {
        if self.contains(product_id) {
            return false;
        }

        self.items.push(product_id.into());

        true
    }

    /// Remove a product. Returns `false` if it was not present.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();

        self.items.retain(|id| id.as_str() != product_id);

        self.items.len() != before
    }

    /// Flip membership of a product, returning whether it is now wishlisted.
    pub fn toggle_item(&mut self, product_id: &str) -> bool {
        if self.remove_item(product_id) {
            false
        } else {
            self.items.push(product_id.into());
            true
        }
    }

    /// Whether a product is wishlisted.
    pub fn contains(&self, product_id: &str) -> bool {
        self.items.iter().any(|id| id.as_str() == product_id)
    }

    /// Remove every product. Returns `false` if it was already empty.
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();

        self.items.clear();

        had_items
    }

    /// Iterate over wishlisted identifiers.
    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.items.iter()
    }

    /// Wishlisted products the catalog still lists.
    pub fn resolved_products<'c, 'a>(&self, catalog: &'c Catalog<'a>) -> Vec<&'c Product<'a>> {
        self.items
            .iter()
            .filter_map(|id| catalog.find_by_id(id.as_str()))
            .collect()
    }

    /// Number of wishlisted products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<ProductId> for Wishlist {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        let mut wishlist = Self::new();

        for id in iter {
            wishlist.add_item(id.as_str());
        }

        wishlist
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn add_item_is_idempotent() {
        let mut wishlist = Wishlist::new();

        assert!(wishlist.add_item("3"));
        assert!(!wishlist.add_item("3"));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn toggle_item_twice_restores_membership() {
        let mut wishlist = Wishlist::new();

        assert!(wishlist.toggle_item("3"));
        assert!(wishlist.contains("3"));

        assert!(!wishlist.toggle_item("3"));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn toggle_item_twice_restores_prior_member_at_the_end() {
        let mut wishlist: Wishlist = ["1", "3", "5"].into_iter().map(ProductId::from).collect();

        assert!(!wishlist.toggle_item("3"));
        assert!(wishlist.toggle_item("3"));

        let ids: Vec<&str> = wishlist.iter().map(ProductId::as_str).collect();

        assert_eq!(ids, vec!["1", "5", "3"]);
    }

    #[test]
    fn remove_item_absent_is_noop() {
        let mut wishlist = Wishlist::new();
        wishlist.add_item("1");

        assert!(!wishlist.remove_item("2"));
        assert!(wishlist.contains("1"));
    }

    #[test]
    fn clear_empties_wishlist() {
        let mut wishlist: Wishlist = ["1", "2"].into_iter().map(ProductId::from).collect();

        assert!(wishlist.clear());
        assert!(!wishlist.clear());
        assert!(wishlist.is_empty());
    }

    #[test]
    fn from_iter_drops_duplicates_and_keeps_order() {
        let wishlist: Wishlist = ["4", "1", "4"].into_iter().map(ProductId::from).collect();

        let ids: Vec<&str> = wishlist.iter().map(ProductId::as_str).collect();

        assert_eq!(ids, vec!["4", "1"]);
    }

    #[test]
    fn resolved_products_skip_delisted() -> TestResult {
        let catalog = Catalog::builtin()?;
        let wishlist: Wishlist = ["gone", "2"].into_iter().map(ProductId::from).collect();

        let names: Vec<&str> = wishlist
            .resolved_products(&catalog)
            .iter()
            .map(|p| p.name.as_str())
            .collect();

        assert_eq!(names, vec!["Matte Velvet Lipstick"]);

        Ok(())
    }
}
