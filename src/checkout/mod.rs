//! Checkout
//!
//! Delivery and payment selection, order pricing, and the submission state machine. A
//! checkout moves from editing to submitting when an order is handed to the gateway, then
//! to placed (clearing the cart) or back to an editable failed state (keeping the cart).

use std::fmt;

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::StoreConfig,
    persistence::SnapshotStore,
    pricing::{CheckoutSummary, DeliveryTier, PricingError},
    products::ProductId,
    session::ShoppingSession,
};

pub mod gateway;

pub use gateway::{GatewayError, MockOrderGateway, OrderConfirmation, OrderGateway, SimulatedGateway};

/// Errors raised while checking out.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing purchasable in the cart.
    #[error("Cannot place an order for an empty cart")]
    EmptyCart,

    /// An order is already being submitted.
    #[error("An order is already being submitted")]
    AlreadySubmitting,

    /// This checkout has already placed its order.
    #[error("This checkout has already placed an order")]
    AlreadyPlaced,

    /// A submission was completed without being started.
    #[error("No order is being submitted")]
    NotSubmitting,

    /// The store offers no delivery tiers.
    #[error("No delivery tiers configured")]
    NoDeliveryTiers,

    /// The store offers no payment methods.
    #[error("No payment methods configured")]
    NoPaymentMethods,

    /// The selected delivery tier is not offered.
    #[error("Unknown delivery tier: {0}")]
    UnknownDeliveryTier(String),

    /// The selected payment method is not offered.
    #[error("Payment method not offered: {0}")]
    UnsupportedPaymentMethod(PaymentMethod),

    /// The order could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The gateway failed to place the order.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Credit or debit card
    #[serde(rename = "card")]
    Card,

    /// Cash on delivery
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Stable identifier used in configuration.
    pub fn id(self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::CashOnDelivery => "cod",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            PaymentMethod::Card => "Credit Card",
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A priced line in an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    /// Product reference
    pub product_id: ProductId,

    /// Product name at the time of ordering
    pub name: String,

    /// Brand at the time of ordering
    pub brand: String,

    /// Chosen variant, if any
    pub variant: Option<String>,

    /// Units ordered
    pub quantity: u32,

    /// Unit price at the time of ordering
    pub unit_price: Money<'static, Currency>,

    /// Unit price multiplied by quantity
    pub line_total: Money<'static, Currency>,
}

/// Everything the gateway needs to place an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    /// Lines the catalog could resolve, in cart order
    pub lines: Vec<OrderLine>,

    /// Selected delivery tier
    pub delivery: DeliveryTier<'static>,

    /// Selected payment method
    pub payment_method: PaymentMethod,

    /// Priced totals
    pub summary: CheckoutSummary<'static>,
}

impl OrderRequest {
    /// Price the session's cart into an order.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`] if no cart line resolves to a listed product.
    /// - [`CheckoutError::Pricing`] if a total overflows or currencies differ.
    pub fn build<S: SnapshotStore>(
        session: &ShoppingSession<'_, '_, S>,
        delivery: &DeliveryTier<'static>,
        payment_method: PaymentMethod,
        tax_rate: &Percentage,
    ) -> Result<Self, CheckoutError> {
        let currency = session.catalog().currency();

        let lines: Vec<OrderLine> = session
            .cart_lines()?
            .into_iter()
            .map(|resolved| OrderLine {
                product_id: resolved.line.product_id().clone(),
                name: resolved.product.name.clone(),
                brand: resolved.product.brand.clone(),
                variant: resolved.line.variant().map(ToString::to_string),
                quantity: resolved.line.quantity(),
                unit_price: Money::from_minor(resolved.product.price.to_minor_units(), currency),
                line_total: Money::from_minor(resolved.line_total.to_minor_units(), currency),
            })
            .collect();

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let summary = price_session(session, delivery, tax_rate)?;

        Ok(Self {
            lines,
            delivery: delivery.clone(),
            payment_method,
            summary,
        })
    }

    /// Total units across all lines.
    pub fn items_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// An order accepted by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    /// Gateway confirmation
    pub confirmation: OrderConfirmation,

    /// The order as submitted
    pub order: OrderRequest,
}

/// Where a checkout is in its submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Selecting delivery and payment.
    Editing,

    /// An order has been handed to the gateway.
    Submitting,

    /// The gateway confirmed the order and the cart was cleared.
    Placed(OrderConfirmation),

    /// The gateway failed; the cart is intact and the order may be retried.
    Failed(GatewayError),
}

impl CheckoutState {
    /// Whether selections may change and an order may be submitted.
    pub fn is_editable(&self) -> bool {
        matches!(self, CheckoutState::Editing | CheckoutState::Failed(_))
    }
}

/// Checkout flow for one order.
#[derive(Debug)]
pub struct Checkout<'cfg> {
    config: &'cfg StoreConfig,
    delivery_tier: &'cfg DeliveryTier<'static>,
    payment_method: PaymentMethod,
    state: CheckoutState,
}

impl<'cfg> Checkout<'cfg> {
    /// Open a checkout with the store's default delivery tier and payment method.
    ///
    /// # Errors
    ///
    /// Returns an error if the store offers no delivery tiers or payment methods.
    pub fn new(config: &'cfg StoreConfig) -> Result<Self, CheckoutError> {
        let delivery_tier = config
            .default_delivery_tier()
            .ok_or(CheckoutError::NoDeliveryTiers)?;

        let payment_method = config
            .default_payment_method()
            .ok_or(CheckoutError::NoPaymentMethods)?;

        Ok(Self {
            config,
            delivery_tier,
            payment_method,
            state: CheckoutState::Editing,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Selected delivery tier.
    pub fn delivery_tier(&self) -> &DeliveryTier<'static> {
        self.delivery_tier
    }

    /// Selected payment method.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Select a delivery tier by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the tier is not offered or the checkout is not editable.
    pub fn select_delivery_tier(&mut self, id: &str) -> Result<(), CheckoutError> {
        self.ensure_editable()?;

        self.delivery_tier = self
            .config
            .delivery_tier(id)
            .ok_or_else(|| CheckoutError::UnknownDeliveryTier(id.to_string()))?;

        Ok(())
    }

    /// Select a payment method.
    ///
    /// # Errors
    ///
    /// Returns an error if the method is not offered or the checkout is not editable.
    pub fn select_payment_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.ensure_editable()?;

        if !self.config.payment_methods.contains(&method) {
            return Err(CheckoutError::UnsupportedPaymentMethod(method));
        }

        self.payment_method = method;

        Ok(())
    }

    /// Price the session's cart with the current selections.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError::Pricing`] if a total overflows or currencies differ.
    pub fn summary<S: SnapshotStore>(
        &self,
        session: &ShoppingSession<'_, '_, S>,
    ) -> Result<CheckoutSummary<'static>, CheckoutError> {
        Ok(price_session(session, self.delivery_tier, &self.config.tax_rate)?)
    }

    /// Price the cart into an order and mark the checkout as submitting.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::AlreadySubmitting`] while a previous submission is in flight.
    /// - [`CheckoutError::AlreadyPlaced`] once the order has been placed.
    /// - [`CheckoutError::EmptyCart`] if the cart has nothing purchasable.
    pub fn begin_submission<S: SnapshotStore>(
        &mut self,
        session: &ShoppingSession<'_, '_, S>,
    ) -> Result<OrderRequest, CheckoutError> {
        self.ensure_editable()?;

        let order = OrderRequest::build(
            session,
            self.delivery_tier,
            self.payment_method,
            &self.config.tax_rate,
        )?;

        self.state = CheckoutState::Submitting;

        info!(
            lines = order.lines.len(),
            total = %order.summary.total(),
            delivery = %order.delivery.id,
            payment = order.payment_method.id(),
            "submitting order"
        );

        Ok(order)
    }

    /// Record the gateway's answer for the in-flight submission.
    ///
    /// On success the session's cart is cleared. On failure the cart is kept and the
    /// checkout becomes editable again.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotSubmitting`] if no submission is in flight.
    /// - [`CheckoutError::Gateway`] carrying the gateway's failure.
    pub fn complete_submission<S: SnapshotStore>(
        &mut self,
        session: &mut ShoppingSession<'_, '_, S>,
        outcome: Result<OrderConfirmation, GatewayError>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if self.state != CheckoutState::Submitting {
            return Err(CheckoutError::NotSubmitting);
        }

        match outcome {
            Ok(confirmation) => {
                session.clear_cart();

                info!(order_id = %confirmation.order_id, "order placed");

                self.state = CheckoutState::Placed(confirmation.clone());

                Ok(confirmation)
            }
            Err(err) => {
                warn!(error = %err, "order failed; cart retained");

                self.state = CheckoutState::Failed(err.clone());

                Err(err.into())
            }
        }
    }

    /// Submit the session's cart through `gateway` and wait for the answer.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::begin_submission`] or [`Self::complete_submission`].
    #[tracing::instrument(
        name = "checkout.place_order",
        skip_all,
        fields(
            delivery = %self.delivery_tier.id,
            payment = self.payment_method.id()
        ),
        err
    )]
    pub async fn place_order<S: SnapshotStore>(
        &mut self,
        session: &mut ShoppingSession<'_, '_, S>,
        gateway: &dyn OrderGateway,
    ) -> Result<PlacedOrder, CheckoutError> {
        let order = self.begin_submission(session)?;

        let outcome = gateway.place_order(order.clone()).await;

        let confirmation = self.complete_submission(session, outcome)?;

        Ok(PlacedOrder {
            confirmation,
            order,
        })
    }

    fn ensure_editable(&self) -> Result<(), CheckoutError> {
        match self.state {
            CheckoutState::Submitting => Err(CheckoutError::AlreadySubmitting),
            CheckoutState::Placed(_) => Err(CheckoutError::AlreadyPlaced),
            CheckoutState::Editing | CheckoutState::Failed(_) => Ok(()),
        }
    }
}

fn price_session<S: SnapshotStore>(
    session: &ShoppingSession<'_, '_, S>,
    delivery: &DeliveryTier<'static>,
    tax_rate: &Percentage,
) -> Result<CheckoutSummary<'static>, PricingError> {
    let currency = session.catalog().currency();
    let subtotal = Money::from_minor(session.cart_total()?.to_minor_units(), currency);

    CheckoutSummary::from_subtotal(subtotal, delivery.price, tax_rate)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;
    use crate::{catalog::Catalog, persistence::MemoryStore};

    #[test]
    fn payment_methods_use_app_identifiers() -> TestResult {
        let methods: Vec<PaymentMethod> = serde_json::from_str(r#"["card","cod"]"#)?;

        assert_eq!(
            methods,
            vec![PaymentMethod::Card, PaymentMethod::CashOnDelivery]
        );
        assert_eq!(PaymentMethod::CashOnDelivery.to_string(), "Cash on Delivery");

        Ok(())
    }

    #[test]
    fn summary_follows_selected_tier() -> TestResult {
        let catalog = Catalog::builtin()?;
        let config = StoreConfig::default();
        let mut session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
        let mut checkout = Checkout::new(&config)?;

        session.add_to_cart("1", 1, None)?;

        assert_eq!(checkout.summary(&session)?.total(), Money::from_minor(5783, USD));

        checkout.select_delivery_tier("express")?;

        assert_eq!(checkout.summary(&session)?.shipping(), Money::from_minor(999, USD));
        assert_eq!(checkout.summary(&session)?.total(), Money::from_minor(6183, USD));

        Ok(())
    }

    #[test]
    fn unknown_selections_are_rejected() -> TestResult {
        let config = StoreConfig {
            payment_methods: vec![PaymentMethod::Card],
            ..StoreConfig::default()
        };
        let mut checkout = Checkout::new(&config)?;

        assert!(matches!(
            checkout.select_delivery_tier("drone"),
            Err(CheckoutError::UnknownDeliveryTier(id)) if id == "drone"
        ));
        assert!(matches!(
            checkout.select_payment_method(PaymentMethod::CashOnDelivery),
            Err(CheckoutError::UnsupportedPaymentMethod(PaymentMethod::CashOnDelivery))
        ));
        assert_eq!(checkout.delivery_tier().id, "standard");
        assert_eq!(checkout.payment_method(), PaymentMethod::Card);

        Ok(())
    }

    #[test]
    fn empty_cart_cannot_be_submitted() -> TestResult {
        let catalog = Catalog::builtin()?;
        let config = StoreConfig::default();
        let mut session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
        let mut checkout = Checkout::new(&config)?;

        assert!(matches!(
            checkout.begin_submission(&session),
            Err(CheckoutError::EmptyCart)
        ));

        session.add_to_cart("delisted", 2, None)?;

        assert!(matches!(
            checkout.begin_submission(&session),
            Err(CheckoutError::EmptyCart)
        ));
        assert_eq!(checkout.state(), &CheckoutState::Editing);

        Ok(())
    }

    #[test]
    fn second_submission_while_in_flight_is_rejected() -> TestResult {
        let catalog = Catalog::builtin()?;
        let config = StoreConfig::default();
        let mut session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
        let mut checkout = Checkout::new(&config)?;

        session.add_to_cart("2", 2, Some("Ruby Red"))?;

        let order = checkout.begin_submission(&session)?;

        assert_eq!(order.items_count(), 2);
        assert!(matches!(
            checkout.begin_submission(&session),
            Err(CheckoutError::AlreadySubmitting)
        ));
        assert!(matches!(
            checkout.select_delivery_tier("express"),
            Err(CheckoutError::AlreadySubmitting)
        ));

        Ok(())
    }

    #[test]
    fn failure_keeps_cart_and_allows_retry() -> TestResult {
        let catalog = Catalog::builtin()?;
        let config = StoreConfig::default();
        let mut session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
        let mut checkout = Checkout::new(&config)?;

        session.add_to_cart("5", 1, None)?;
        checkout.begin_submission(&session)?;

        let result = checkout.complete_submission(
            &mut session,
            Err(GatewayError::Unavailable("timeout".to_string())),
        );

        assert!(matches!(result, Err(CheckoutError::Gateway(_))));
        assert!(checkout.state().is_editable());
        assert_eq!(session.cart_items_count(), 1);

        checkout.begin_submission(&session)?;

        let confirmation = checkout.complete_submission(
            &mut session,
            Ok(OrderConfirmation {
                order_id: "LUMA-000042".to_string(),
            }),
        )?;

        assert_eq!(confirmation.order_id, "LUMA-000042");
        assert!(session.cart().is_empty());
        assert!(matches!(
            checkout.begin_submission(&session),
            Err(CheckoutError::AlreadyPlaced)
        ));

        Ok(())
    }

    #[test]
    fn completing_without_submission_is_rejected() -> TestResult {
        let catalog = Catalog::builtin()?;
        let config = StoreConfig::default();
        let mut session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
        let mut checkout = Checkout::new(&config)?;

        let result = checkout.complete_submission(
            &mut session,
            Ok(OrderConfirmation {
                order_id: "LUMA-000001".to_string(),
            }),
        );

        assert!(matches!(result, Err(CheckoutError::NotSubmitting)));

        Ok(())
    }
}
