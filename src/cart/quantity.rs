//! Quantity steppers

/// Bounded +/- control for choosing a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityStepper {
    min: u32,
    max: u32,
}

impl QuantityStepper {
    /// Stepper on the product page, before adding to the cart.
    pub const PRODUCT_PAGE: QuantityStepper = QuantityStepper { min: 1, max: 10 };

    /// Stepper on a cart line.
    pub const CART_LINE: QuantityStepper = QuantityStepper { min: 1, max: 99 };

    /// Create a stepper. `min` is raised to 1 and `max` to at least `min`.
    #[must_use]
    pub fn new(min: u32, max: u32) -> Self {
        let min = min.max(1);

        Self {
            min,
            max: max.max(min),
        }
    }

    /// Smallest selectable quantity.
    #[must_use]
    pub fn min(self) -> u32 {
        self.min
    }

    /// Largest selectable quantity.
    #[must_use]
    pub fn max(self) -> u32 {
        self.max
    }

    /// Bring `quantity` into range.
    #[must_use]
    pub fn clamp(self, quantity: u32) -> u32 {
        quantity.clamp(self.min, self.max)
    }

    /// Quantity after pressing "+".
    #[must_use]
    pub fn increment(self, quantity: u32) -> u32 {
        self.clamp(quantity.saturating_add(1))
    }

    /// Quantity after pressing "-".
    #[must_use]
    pub fn decrement(self, quantity: u32) -> u32 {
        self.clamp(quantity.saturating_sub(1))
    }

    /// Whether "+" is enabled.
    #[must_use]
    pub fn can_increment(self, quantity: u32) -> bool {
        quantity < self.max
    }

    /// Whether "-" is enabled.
    #[must_use]
    pub fn can_decrement(self, quantity: u32) -> bool {
        quantity > self.min
    }
}
