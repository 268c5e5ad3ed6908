//! Integration tests for the async checkout flow.

use std::time::Duration;

use luma::{checkout::MockOrderGateway, prelude::*};
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

#[tokio::test(start_paused = true)]
async fn successful_order_clears_cart() -> TestResult {
    let catalog = Catalog::builtin()?;
    let config = StoreConfig::default();
    let mut session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
    let mut checkout = Checkout::new(&config)?;
    let gateway = SimulatedGateway::new(Duration::from_secs(2));

    session.add_to_cart("1", 1, None)?;
    session.add_to_wishlist("1");

    let placed = checkout.place_order(&mut session, &gateway).await?;

    assert_eq!(placed.order.summary.total(), Money::from_minor(5783, USD));
    assert_eq!(placed.order.payment_method, PaymentMethod::Card);
    assert_eq!(
        checkout.state(),
        &CheckoutState::Placed(placed.confirmation.clone())
    );
    assert!(session.cart().is_empty());
    assert!(session.is_in_wishlist("1"));

    let stored = ShoppingSession::restore(&catalog, session.into_store(), &config.persistence);

    assert!(stored.cart().is_empty());

    Ok(())
}

#[tokio::test]
async fn gateway_failure_keeps_cart() -> TestResult {
    let catalog = Catalog::builtin()?;
    let config = StoreConfig::default();
    let mut session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
    let mut checkout = Checkout::new(&config)?;
    let mut gateway = MockOrderGateway::new();

    gateway
        .expect_place_order()
        .times(1)
        .returning(|_| Err(GatewayError::Rejected("card declined".to_string())));

    session.add_to_cart("4", 2, Some("Light"))?;

    let result = checkout.place_order(&mut session, &gateway).await;

    assert!(matches!(
        result,
        Err(CheckoutError::Gateway(GatewayError::Rejected(_)))
    ));
    assert!(checkout.state().is_editable());
    assert_eq!(session.cart_items_count(), 2);

    Ok(())
}

#[tokio::test]
async fn order_request_carries_selections() -> TestResult {
    let catalog = Catalog::builtin()?;
    let config = StoreConfig::default();
    let mut session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
    let mut checkout = Checkout::new(&config)?;
    let mut gateway = MockOrderGateway::new();

    gateway
        .expect_place_order()
        .withf(|order| {
            order.delivery.id == "express"
                && order.payment_method == PaymentMethod::CashOnDelivery
                && order.items_count() == 3
                && order.summary.shipping() == Money::from_minor(999, USD)
        })
        .times(1)
        .returning(|_| {
            Ok(OrderConfirmation {
                order_id: "LUMA-000100".to_string(),
            })
        });

    session.add_to_cart("2", 1, Some("Dusty Rose"))?;
    session.add_to_cart("8", 2, None)?;

    checkout.select_delivery_tier("express")?;
    checkout.select_payment_method(PaymentMethod::CashOnDelivery)?;

    let placed = checkout.place_order(&mut session, &gateway).await?;

    assert_eq!(placed.confirmation.order_id, "LUMA-000100");
    assert_eq!(
        placed
            .order
            .lines
            .iter()
            .map(|line| line.variant.as_deref())
            .collect::<Vec<_>>(),
        vec![Some("Dusty Rose"), None]
    );

    Ok(())
}

#[tokio::test]
async fn empty_cart_never_reaches_gateway() -> TestResult {
    let catalog = Catalog::builtin()?;
    let config = StoreConfig::default();
    let mut session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
    let mut checkout = Checkout::new(&config)?;
    let mut gateway = MockOrderGateway::new();

    gateway.expect_place_order().never();

    let result = checkout.place_order(&mut session, &gateway).await;

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert_eq!(checkout.state(), &CheckoutState::Editing);

    Ok(())
}

#[tokio::test]
async fn placed_checkout_rejects_resubmission() -> TestResult {
    let catalog = Catalog::builtin()?;
    let config = StoreConfig::default();
    let mut session = ShoppingSession::new(&catalog, MemoryStore::new(), &config.persistence);
    let mut checkout = Checkout::new(&config)?;
    let gateway = SimulatedGateway::new(Duration::ZERO);

    session.add_to_cart("7", 1, None)?;
    checkout.place_order(&mut session, &gateway).await?;

    session.add_to_cart("7", 1, None)?;

    let result = checkout.place_order(&mut session, &gateway).await;

    assert!(matches!(result, Err(CheckoutError::AlreadyPlaced)));
    assert_eq!(session.cart_items_count(), 1);

    Ok(())
}
