use super::order::{Order, OrderId};
use super::recurring::{DisableRequest, DisableResponse};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Durable storage of orders, owned by the commerce system.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order or refreshes its commerce-owned fields, keeping any removal state.
    async fn upsert_order(&self, order: Order) -> Result<()>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Completed orders carrying a transaction reference, ascending by id,
    /// strictly after `after`, at most `limit` of them.
    async fn completed_page(&self, after: Option<OrderId>, limit: usize) -> Result<Vec<Order>>;

    /// Unknown ids read as not processed.
    async fn is_removal_processed(&self, id: OrderId) -> Result<bool>;

    async fn mark_removal_processed(&self, id: OrderId, status: String) -> Result<()>;
}

/// The payment gateway's recurring contract service.
#[async_trait]
pub trait RecurringGateway: Send + Sync {
    async fn disable(
        &self,
        request: &DisableRequest,
    ) -> std::result::Result<DisableResponse, GatewayError>;
}

/// Suspends forward progress for a cooldown.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self, duration: Duration);
}

pub type OrderStoreBox = Box<dyn OrderStore>;
pub type RecurringGatewayBox = Box<dyn RecurringGateway>;
