//! Order gateway

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::info;

use crate::{checkout::OrderRequest, config::StoreConfig};

/// Order identifier assigned by a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Gateway order number
    pub order_id: String,
}

/// Errors returned by an order gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The gateway declined the order.
    #[error("Order rejected: {0}")]
    Rejected(String),

    /// The gateway could not be reached.
    #[error("Order gateway unavailable: {0}")]
    Unavailable(String),
}

/// Gateway that confirms every order after a fixed delay.
#[derive(Debug)]
pub struct SimulatedGateway {
    latency: Duration,
    next_order: AtomicU64,
}

impl SimulatedGateway {
    /// Create a gateway that waits `latency` before confirming.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            next_order: AtomicU64::new(1),
        }
    }

    /// Create a gateway using the configured order latency.
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.order_latency)
    }
}

#[async_trait]
impl OrderGateway for SimulatedGateway {
    async fn place_order(&self, order: OrderRequest) -> Result<OrderConfirmation, GatewayError> {
        tokio::time::sleep(self.latency).await;

        let sequence = self.next_order.fetch_add(1, Ordering::Relaxed);
        let order_id = format!("LUMA-{sequence:06}");

        info!(
            order_id,
            lines = order.lines.len(),
            total = %order.summary.total(),
            "simulated order placed"
        );

        Ok(OrderConfirmation { order_id })
    }
}

/// Submits priced orders.
#[automock]
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit an order, returning its confirmation.
    async fn place_order(&self, order: OrderRequest) -> Result<OrderConfirmation, GatewayError>;
}
